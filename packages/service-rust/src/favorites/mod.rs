//! Favorite schools: [`FavoritesStore`](crate::traits::FavoritesStore)
//! implementations and the reactive favorites list.

pub mod json_file;
pub mod memory;
pub mod view;

pub use json_file::JsonFileFavorites;
pub use memory::MemoryFavorites;
pub use view::FavoritesView;

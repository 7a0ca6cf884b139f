//! Kuralist Service — reactive school filtering over a synced record store.
//!
//! The [`FilterEngine`] task turns intents and record feed updates into a
//! filtered view. [`SyncService`] fills the [`SchoolStore`] from the local
//! cache and the remote table; [`Services`] wires everything together.

pub mod cache;
pub mod config;
pub mod engine;
pub mod favorites;
pub mod logging;
pub mod remote;
pub mod services;
pub mod store;
pub mod sync;
pub mod traits;

pub use config::{EngineConfig, RemoteConfig, ServiceConfig, SyncConfig};
pub use engine::{FilterEngine, FilteredView};
pub use services::Services;
pub use store::SchoolStore;
pub use sync::{SyncError, SyncService, SyncStatus};
pub use traits::{FavoritesStore, RemoteSchoolSource, SchoolCache};

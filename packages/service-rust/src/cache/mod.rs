//! [`SchoolCache`](crate::traits::SchoolCache) implementations.

pub mod json_file;
pub mod null;

pub use json_file::JsonFileCache;
pub use null::NullSchoolCache;

//! Kuralist Core — school records, filter criteria, filtering and option resolution.
//!
//! Everything here is synchronous and pure over in-memory values. The
//! reactive engine that drives these functions lives in `kuralist-service`.

pub mod category;
pub mod criteria;
pub mod favorites;
pub mod filter;
pub mod geo;
pub mod resolver;
pub mod school;
pub mod sheet;
pub mod snapshot;
pub mod threshold;
pub mod validation;

pub use category::{Category, UnknownCategory};
pub use criteria::FilterCriteria;
pub use favorites::{select_favorites, FavoriteIds};
pub use filter::filter_schools;
pub use geo::{schools_within, BoundingBox, Coordinates};
pub use resolver::{distinct_values, OptionResolver};
pub use school::School;
pub use sheet::FilterSheet;
pub use snapshot::SchoolSnapshot;
pub use threshold::{ThresholdFilter, UnknownThresholdFilter, HIGH_ACHIEVER_PASS_RATE};
pub use validation::ValidationResult;

//! Filter Option Resolver: distinct candidate values per category.
//!
//! [`distinct_values`] is the pure computation. [`OptionResolver`] memoizes it
//! per category and drops the whole cache whenever it is handed a snapshot
//! with a different version than the one its entries were computed from.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::category::Category;
use crate::school::School;
use crate::snapshot::SchoolSnapshot;

/// Distinct, non-blank values of `category` across `schools`, sorted
/// ascending by ordinal comparison.
#[must_use]
pub fn distinct_values(category: Category, schools: &[School]) -> Vec<String> {
    schools
        .iter()
        .filter_map(|school| school.category_value(category))
        .filter(|value| !value.trim().is_empty())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Memoizing resolver keyed by category, invalidated wholesale per snapshot.
#[derive(Debug, Default)]
pub struct OptionResolver {
    version: Option<u64>,
    cache: HashMap<Category, Arc<[String]>>,
}

impl OptionResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the option list for `category` in `snapshot`, computing it on
    /// first use for that snapshot version.
    pub fn resolve(&mut self, category: Category, snapshot: &SchoolSnapshot) -> Arc<[String]> {
        if self.version != Some(snapshot.version()) {
            self.invalidate();
            self.version = Some(snapshot.version());
        }

        if let Some(options) = self.cache.get(&category) {
            return Arc::clone(options);
        }

        let options: Arc<[String]> = distinct_values(category, snapshot.schools()).into();
        debug!(
            category = category.name(),
            count = options.len(),
            version = snapshot.version(),
            "resolved filter options"
        );
        self.cache.insert(category, Arc::clone(&options));
        options
    }

    /// Resolves by category name. Unknown names yield an empty list.
    pub fn resolve_named(&mut self, name: &str, snapshot: &SchoolSnapshot) -> Arc<[String]> {
        match name.parse::<Category>() {
            Ok(category) => self.resolve(category, snapshot),
            Err(err) => {
                warn!(%err, "no options for unknown category");
                Arc::from(Vec::new())
            }
        }
    }

    /// Computes every category up front for `snapshot`.
    pub fn warm(&mut self, snapshot: &SchoolSnapshot) {
        for category in Category::ALL {
            self.resolve(category, snapshot);
        }
    }

    /// Drops every cached entry.
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.version = None;
    }

    /// Whether `category` is cached for the given snapshot version.
    #[must_use]
    pub fn is_cached(&self, category: Category, version: u64) -> bool {
        self.version == Some(version) && self.cache.contains_key(&category)
    }
}

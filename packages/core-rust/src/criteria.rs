//! The mutable filter criteria set.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::threshold::ThresholdFilter;

/// Everything the filtered view is a function of, apart from the records.
///
/// At most one value per category. Ordered collections keep iteration and
/// serialization deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free search text, untrimmed.
    pub search_text: String,
    /// Selected value per category.
    pub category_filters: BTreeMap<Category, String>,
    /// Active threshold toggles.
    pub threshold_filters: BTreeSet<ThresholdFilter>,
}

impl FilterCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or replaces the value for `category`, returning the previous one.
    pub fn set_category(
        &mut self,
        category: Category,
        value: impl Into<String>,
    ) -> Option<String> {
        self.category_filters.insert(category, value.into())
    }

    /// Removes the filter for `category`. No-op when absent.
    pub fn clear_category(&mut self, category: Category) -> Option<String> {
        self.category_filters.remove(&category)
    }

    /// Currently selected value for `category`.
    #[must_use]
    pub fn selected(&self, category: Category) -> Option<&str> {
        self.category_filters.get(&category).map(String::as_str)
    }

    /// Flips `filter` and returns whether it is now active.
    pub fn toggle(&mut self, filter: ThresholdFilter) -> bool {
        if self.threshold_filters.remove(&filter) {
            false
        } else {
            self.threshold_filters.insert(filter);
            true
        }
    }

    #[must_use]
    pub fn is_active(&self, filter: ThresholdFilter) -> bool {
        self.threshold_filters.contains(&filter)
    }

    /// Trimmed, lowercased search needle, or `None` when the text is blank.
    #[must_use]
    pub fn search_needle(&self) -> Option<String> {
        let trimmed = self.search_text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    /// True when no criterion restricts the record set.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.search_needle().is_none()
            && self.category_filters.is_empty()
            && self.threshold_filters.is_empty()
    }

    /// Number of active category and threshold filters (search excluded).
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        self.category_filters.len() + self.threshold_filters.len()
    }

    /// Resets every criterion.
    pub fn clear(&mut self) {
        self.search_text.clear();
        self.category_filters.clear();
        self.threshold_filters.clear();
    }
}

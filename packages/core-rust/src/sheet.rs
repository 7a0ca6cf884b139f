//! The option sheet published while a category's values are being chosen.

use std::sync::Arc;

use serde::Serialize;

use crate::category::Category;

/// Selection context for the category currently being chosen from.
///
/// At most one sheet is open at a time. Opened by requesting options for a
/// category, closed by selecting a value or dismissing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSheet {
    pub category: Category,
    /// Candidate values, distinct and sorted.
    pub options: Arc<[String]>,
    /// Value already selected for `category`, if any.
    pub selected: Option<String>,
}

impl FilterSheet {
    /// Whether `option` should be rendered as the current selection.
    #[must_use]
    pub fn is_selected(&self, option: &str) -> bool {
        self.selected.as_deref() == Some(option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> FilterSheet {
        FilterSheet {
            category: Category::City,
            options: Arc::from(vec!["Auckland".to_string(), "Nelson".to_string()]),
            selected: Some("Nelson".to_string()),
        }
    }

    #[test]
    fn serializes_options_as_a_plain_array() {
        let value = serde_json::to_value(sheet()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "category": "City",
                "options": ["Auckland", "Nelson"],
                "selected": "Nelson",
            })
        );
    }

    #[test]
    fn only_the_selected_option_is_marked() {
        let sheet = sheet();
        assert!(sheet.is_selected("Nelson"));
        assert!(!sheet.is_selected("Auckland"));
        assert!(!sheet.is_selected("nelson"));
    }
}

//! Filter categories: the record fields a single-value equality filter can target.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A categorical field a user can filter on with one selected value.
///
/// Ordering follows the order the categories are presented in, which also
/// makes the iteration order of a `BTreeMap<Category, _>` deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// `town_city`.
    City,
    /// `suburb`.
    Suburb,
    /// `school_type`. Also accepted under the name `SchoolType`.
    #[serde(alias = "SchoolType")]
    Level,
    /// `authority`.
    Authority,
    /// `gender_of_students`.
    Gender,
}

impl Category {
    /// Every category, in presentation order.
    pub const ALL: [Category; 5] = [
        Category::City,
        Category::Suburb,
        Category::Level,
        Category::Authority,
        Category::Gender,
    ];

    /// Display name, also the canonical parse input.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Category::City => "City",
            Category::Suburb => "Suburb",
            Category::Level => "Level",
            Category::Authority => "Authority",
            Category::Gender => "Gender",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a category name does not match any known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive; `SchoolType` is an alias for [`Category::Level`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("schooltype") || trimmed.eq_ignore_ascii_case("school_type")
        {
            return Ok(Category::Level);
        }
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

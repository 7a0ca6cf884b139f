//! Threshold filters: named boolean toggles with fixed predicates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::school::School;

/// Pass rate (percent) a school must strictly exceed to count as a high achiever.
pub const HIGH_ACHIEVER_PASS_RATE: f64 = 70.0;

/// A toggleable filter whose predicate is hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdFilter {
    /// Year 13 UE or NCEA pass rate above [`HIGH_ACHIEVER_PASS_RATE`].
    HighAchievers,
    /// At least one international student enrolled.
    InternationalStudents,
}

impl ThresholdFilter {
    pub const ALL: [ThresholdFilter; 2] = [
        ThresholdFilter::HighAchievers,
        ThresholdFilter::InternationalStudents,
    ];

    /// Stable identifier, also the canonical parse input.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ThresholdFilter::HighAchievers => "high_achievers",
            ThresholdFilter::InternationalStudents => "international_students",
        }
    }

    /// Short chip label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ThresholdFilter::HighAchievers => "UE/NCEA >70%",
            ThresholdFilter::InternationalStudents => "International",
        }
    }

    /// Whether `school` passes this filter. Missing values never pass.
    #[must_use]
    pub fn matches(self, school: &School) -> bool {
        match self {
            ThresholdFilter::HighAchievers => [
                school.ue_pass_rate_2023_year_13,
                school.ncea_pass_rate_2023_year_13,
            ]
            .into_iter()
            .flatten()
            .any(|rate| rate > HIGH_ACHIEVER_PASS_RATE),
            ThresholdFilter::InternationalStudents => {
                school.international_students.is_some_and(|n| n > 0)
            }
        }
    }
}

impl fmt::Display for ThresholdFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown threshold filter: {0}")]
pub struct UnknownThresholdFilter(pub String);

impl FromStr for ThresholdFilter {
    type Err = UnknownThresholdFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high_achievers" | "achievers" | "ue" => Ok(ThresholdFilter::HighAchievers),
            "international_students" | "international" => {
                Ok(ThresholdFilter::InternationalStudents)
            }
            _ => Err(UnknownThresholdFilter(s.to_string())),
        }
    }
}

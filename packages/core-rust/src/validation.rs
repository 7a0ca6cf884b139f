//! Record-level invariant checks.
//!
//! Invalid records are reported, not rejected: filtering stays total over
//! whatever the store holds.

use crate::school::School;

/// Result of validating a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The record satisfies every invariant.
    Valid,
    /// The record violates one or more invariants.
    Invalid {
        /// Human-readable description of each violation.
        errors: Vec<String>,
    },
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Checks percentage ranges and latitude/longitude pairing.
#[must_use]
pub fn validate_school(school: &School) -> ValidationResult {
    let percentages = [
        ("ue_pass_rate_2023_all_leavers", school.ue_pass_rate_2023_all_leavers),
        ("ncea_pass_rate_2023_all_leavers", school.ncea_pass_rate_2023_all_leavers),
        ("ue_pass_rate_2023_year_13", school.ue_pass_rate_2023_year_13),
        ("ncea_pass_rate_2023_year_13", school.ncea_pass_rate_2023_year_13),
        ("european_percentage", school.european_percentage),
        ("maori_percentage", school.maori_percentage),
        ("pacific_percentage", school.pacific_percentage),
        ("asian_percentage", school.asian_percentage),
        ("melaa_percentage", school.melaa_percentage),
        ("other_percentage", school.other_percentage),
        ("international_percentage", school.international_percentage),
    ];

    let mut errors: Vec<String> = percentages
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .filter(|v| !(0.0..=100.0).contains(v))
                .map(|v| format!("{field} out of range [0, 100]: {v}"))
        })
        .collect();

    if school.latitude.is_some() != school.longitude.is_some() {
        errors.push("latitude and longitude must be both present or both absent".to_string());
    }

    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid { errors }
    }
}

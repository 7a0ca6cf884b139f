//! School record as synchronised from the remote `schools` table.
//!
//! Field names serialize to the snake_case column names of the remote row so
//! that cached snapshots and remote pages share one JSON shape. Every column
//! except identity, name and timestamps is optional.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::geo::Coordinates;
use crate::validation::{validate_school, ValidationResult};

/// A single New Zealand school record.
///
/// `id` is the Ministry school number and is stable across syncs. Rate and
/// percentage fields are in `[0, 100]` when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct School {
    /// Ministry school number (`school_number` column).
    #[serde(rename = "school_number")]
    pub id: i64,
    /// Display name used for sorting and search.
    pub school_name: String,

    // --- Contact ---
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub principal: Option<String>,
    #[serde(default)]
    pub school_website: Option<String>,

    // --- Address ---
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub town_city: Option<String>,
    #[serde(default)]
    pub postal_address: Option<String>,
    #[serde(default)]
    pub postal_address_suburb: Option<String>,
    #[serde(default)]
    pub postal_address_city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<i32>,
    #[serde(default)]
    pub urban_rural: Option<String>,

    // --- Classification ---
    #[serde(default)]
    pub school_type: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    /// e.g. "State", "State: Integrated", "Private".
    #[serde(default)]
    pub authority: Option<String>,
    #[serde(default)]
    pub donations: Option<String>,
    /// "Co-Educational", "Single Sex (Boys School)", ...
    #[serde(default)]
    pub gender_of_students: Option<String>,
    #[serde(default)]
    pub kme_peak_body: Option<String>,

    // --- Administrative regions ---
    #[serde(default)]
    pub takiwa: Option<String>,
    #[serde(default)]
    pub territorial_authority: Option<String>,
    #[serde(default)]
    pub regional_council: Option<String>,
    #[serde(default)]
    pub local_office: Option<String>,
    #[serde(default)]
    pub education_region: Option<String>,
    #[serde(default)]
    pub general_electorate: Option<String>,
    #[serde(default)]
    pub maori_electorate: Option<String>,
    #[serde(default)]
    pub neighbourhood_sa2_code: Option<i32>,
    #[serde(default)]
    pub neighbourhood_sa2_name: Option<String>,
    #[serde(default)]
    pub ward: Option<String>,
    /// Community of Learning identifier.
    #[serde(default)]
    pub col_id: Option<String>,
    /// Community of Learning name.
    #[serde(default)]
    pub col_name: Option<String>,

    // --- Location ---
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub enrolment_scheme: Option<String>,

    // --- Roll and demographics ---
    /// Equity Index.
    #[serde(default)]
    pub eqi: Option<i32>,
    #[serde(default)]
    pub total_school_roll: Option<i32>,
    #[serde(default)]
    pub european_pakeha_students: Option<i32>,
    #[serde(default)]
    pub maori_students: Option<i32>,
    #[serde(default)]
    pub pacific_students: Option<i32>,
    #[serde(default)]
    pub asian_students: Option<i32>,
    #[serde(default)]
    pub melaa_students: Option<i32>,
    #[serde(default)]
    pub other_students: Option<i32>,
    #[serde(default)]
    pub international_students: Option<i32>,
    #[serde(default)]
    pub isolation_index: Option<f64>,
    #[serde(default)]
    pub language_of_instruction: Option<String>,
    #[serde(default)]
    pub boarding_facilities: Option<bool>,
    #[serde(default)]
    pub cohort_entry: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,

    // --- Academic performance (percentages) ---
    #[serde(default)]
    pub ue_pass_rate_2023_all_leavers: Option<f64>,
    #[serde(default)]
    pub ncea_pass_rate_2023_all_leavers: Option<f64>,
    #[serde(default)]
    pub ue_pass_rate_2023_year_13: Option<f64>,
    #[serde(default)]
    pub ncea_pass_rate_2023_year_13: Option<f64>,
    #[serde(default)]
    pub eqi_rank: Option<f64>,
    #[serde(default)]
    pub eqi_deciles: Option<i32>,

    // --- Demographic breakdown (percentages) ---
    #[serde(default)]
    pub european_percentage: Option<f64>,
    #[serde(default)]
    pub maori_percentage: Option<f64>,
    #[serde(default)]
    pub pacific_percentage: Option<f64>,
    #[serde(default)]
    pub asian_percentage: Option<f64>,
    #[serde(default)]
    pub melaa_percentage: Option<f64>,
    #[serde(default)]
    pub other_percentage: Option<f64>,
    #[serde(default)]
    pub international_percentage: Option<f64>,
    #[serde(default)]
    pub total_ue_ncea: Option<i32>,
    #[serde(default)]
    pub total_ue_ncea_y13: Option<i32>,

    // --- Timestamps (ISO-8601 strings as stored remotely) ---
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl School {
    /// Creates a record with only identity and name set.
    #[must_use]
    pub fn new(id: i64, school_name: impl Into<String>) -> Self {
        Self {
            id,
            school_name: school_name.into(),
            ..Self::default()
        }
    }

    /// Lowercased concatenation of name, suburb, city, authority and type.
    ///
    /// Missing parts contribute an empty string so the separators stay put.
    #[must_use]
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.school_name,
            self.suburb.as_deref().unwrap_or_default(),
            self.town_city.as_deref().unwrap_or_default(),
            self.authority.as_deref().unwrap_or_default(),
            self.school_type.as_deref().unwrap_or_default(),
        )
        .to_lowercase()
    }

    /// "City, Suburb" from whichever parts are present.
    #[must_use]
    pub fn location(&self) -> String {
        [self.town_city.as_deref(), self.suburb.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Map position, only when both latitude and longitude are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    /// Value of the field a category filter compares against.
    #[must_use]
    pub fn category_value(&self, category: Category) -> Option<&str> {
        match category {
            Category::City => self.town_city.as_deref(),
            Category::Suburb => self.suburb.as_deref(),
            Category::Level => self.school_type.as_deref(),
            Category::Authority => self.authority.as_deref(),
            Category::Gender => self.gender_of_students.as_deref(),
        }
    }

    /// Checks the record's range and pairing invariants.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        validate_school(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_remote_row_with_missing_columns() {
        let json = r#"{
            "school_number": 41,
            "school_name": "Highgate School",
            "town_city": "Dunedin",
            "ue_pass_rate_2023_year_13": 72.5,
            "boarding_facilities": false,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-06-01T00:00:00Z"
        }"#;

        let school: School = serde_json::from_str(json).unwrap();
        assert_eq!(school.id, 41);
        assert_eq!(school.school_name, "Highgate School");
        assert_eq!(school.town_city.as_deref(), Some("Dunedin"));
        assert_eq!(school.ue_pass_rate_2023_year_13, Some(72.5));
        assert_eq!(school.boarding_facilities, Some(false));
        assert!(school.suburb.is_none());
    }

    #[test]
    fn serializes_id_as_school_number() {
        let school = School::new(7, "Bay School");
        let value = serde_json::to_value(&school).unwrap();
        assert_eq!(value["school_number"], 7);
        assert!(value.get("id").is_none());
    }

    #[test]
    fn searchable_text_is_lowercased_and_keeps_separators() {
        let school = School {
            suburb: Some("Roslyn".to_string()),
            town_city: Some("Dunedin".to_string()),
            authority: Some("State".to_string()),
            school_type: None,
            ..School::new(1, "Highgate School")
        };
        assert_eq!(school.searchable_text(), "highgate school roslyn dunedin state ");
    }

    #[test]
    fn location_joins_present_parts() {
        let mut school = School::new(1, "A");
        assert_eq!(school.location(), "");

        school.town_city = Some("Auckland".to_string());
        assert_eq!(school.location(), "Auckland");

        school.suburb = Some("Ponsonby".to_string());
        assert_eq!(school.location(), "Auckland, Ponsonby");
    }

    #[test]
    fn coordinates_require_both_axes() {
        let mut school = School::new(1, "A");
        school.latitude = Some(-36.85);
        assert!(school.coordinates().is_none());

        school.longitude = Some(174.76);
        let coords = school.coordinates().unwrap();
        assert!((coords.latitude + 36.85).abs() < f64::EPSILON);
        assert!((coords.longitude - 174.76).abs() < f64::EPSILON);
    }

    #[test]
    fn category_value_maps_each_category_to_its_field() {
        let school = School {
            town_city: Some("Auckland".to_string()),
            suburb: Some("Epsom".to_string()),
            school_type: Some("Secondary (Year 9-15)".to_string()),
            authority: Some("State".to_string()),
            gender_of_students: Some("Co-Educational".to_string()),
            ..School::new(1, "A")
        };

        assert_eq!(school.category_value(Category::City), Some("Auckland"));
        assert_eq!(school.category_value(Category::Suburb), Some("Epsom"));
        assert_eq!(
            school.category_value(Category::Level),
            Some("Secondary (Year 9-15)")
        );
        assert_eq!(school.category_value(Category::Authority), Some("State"));
        assert_eq!(school.category_value(Category::Gender), Some("Co-Educational"));
    }
}

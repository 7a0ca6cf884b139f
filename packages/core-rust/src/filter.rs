//! The filtering pipeline: search, category equality, thresholds, then sort.
//!
//! [`filter_schools`] is a pure function of its two inputs. Filters are
//! AND-combined, so the order in which category filters are applied affects
//! only how quickly the candidate set shrinks, never the result.

use crate::criteria::FilterCriteria;
use crate::school::School;

/// Case-insensitive equality without allocating lowercased copies.
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Whether `school` passes every criterion in `criteria`.
///
/// `needle` is the pre-computed [`FilterCriteria::search_needle`], passed in so
/// a full pass lowercases the search text once rather than once per record.
#[must_use]
pub fn matches(school: &School, criteria: &FilterCriteria, needle: Option<&str>) -> bool {
    if let Some(needle) = needle {
        if !school.searchable_text().contains(needle) {
            return false;
        }
    }

    let categories_match = criteria.category_filters.iter().all(|(category, value)| {
        school
            .category_value(*category)
            .is_some_and(|field| eq_ignore_case(field, value))
    });
    if !categories_match {
        return false;
    }

    criteria
        .threshold_filters
        .iter()
        .all(|filter| filter.matches(school))
}

/// Applies `criteria` to `schools` and returns the survivors sorted by name.
///
/// Sorting is ascending by `school_name` using ordinal (case-sensitive)
/// comparison. The sort is stable, so equal names keep their input order.
#[must_use]
pub fn filter_schools<'a>(schools: &'a [School], criteria: &FilterCriteria) -> Vec<&'a School> {
    let needle = criteria.search_needle();
    let mut result: Vec<&School> = schools
        .iter()
        .filter(|school| matches(school, criteria, needle.as_deref()))
        .collect();
    sort_by_name(&mut result);
    result
}

/// Stable ascending sort by display name.
pub fn sort_by_name(schools: &mut [&School]) {
    schools.sort_by(|a, b| a.school_name.cmp(&b.school_name));
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::category::Category;
    use crate::threshold::ThresholdFilter;

    fn school(id: i64, name: &str, city: Option<&str>, rate: Option<f64>) -> School {
        School {
            town_city: city.map(str::to_string),
            ue_pass_rate_2023_year_13: rate,
            ..School::new(id, name)
        }
    }

    fn scenario() -> Vec<School> {
        vec![
            school(1, "Bay School", Some("Auckland"), Some(75.0)),
            school(2, "Arrow School", Some("Auckland"), Some(60.0)),
            school(3, "Zed School", Some("Wellington"), None),
        ]
    }

    fn names(result: &[&School]) -> Vec<String> {
        result.iter().map(|s| s.school_name.clone()).collect()
    }

    #[test]
    fn city_and_achievers_filters_combine_conjunctively() {
        let schools = scenario();
        let mut criteria = FilterCriteria::new();
        criteria.set_category(Category::City, "Auckland");
        criteria.toggle(ThresholdFilter::HighAchievers);

        assert_eq!(names(&filter_schools(&schools, &criteria)), ["Bay School"]);
    }

    #[test]
    fn city_filter_alone_sorts_survivors_by_name() {
        let schools = scenario();
        let mut criteria = FilterCriteria::new();
        criteria.set_category(Category::City, "Auckland");

        assert_eq!(
            names(&filter_schools(&schools, &criteria)),
            ["Arrow School", "Bay School"]
        );
    }

    #[test]
    fn category_match_is_case_insensitive() {
        let schools = scenario();
        let mut criteria = FilterCriteria::new();
        criteria.set_category(Category::City, "aUCKLAND");

        assert_eq!(filter_schools(&schools, &criteria).len(), 2);
    }

    #[test]
    fn null_field_never_matches_a_category_filter() {
        let schools = vec![school(1, "No City", None, None)];
        let mut criteria = FilterCriteria::new();
        criteria.set_category(Category::City, "");

        assert!(filter_schools(&schools, &criteria).is_empty());
    }

    #[test]
    fn filter_on_value_absent_from_records_yields_empty() {
        let schools = scenario();
        let mut criteria = FilterCriteria::new();
        criteria.set_category(Category::Gender, "Girls School");

        assert!(filter_schools(&schools, &criteria).is_empty());
    }

    #[test]
    fn search_is_substring_and_case_insensitive() {
        let schools = vec![
            school(1, "Highgate School", Some("Dunedin"), None),
            school(2, "Bay School", Some("Auckland"), None),
        ];
        let mut criteria = FilterCriteria::new();

        criteria.search_text = "high".to_string();
        assert_eq!(names(&filter_schools(&schools, &criteria)), ["Highgate School"]);

        criteria.search_text = "  HIGH  ".to_string();
        assert_eq!(names(&filter_schools(&schools, &criteria)), ["Highgate School"]);

        criteria.search_text = "auckland".to_string();
        assert_eq!(names(&filter_schools(&schools, &criteria)), ["Bay School"]);
    }

    #[test]
    fn blank_search_applies_no_restriction() {
        let schools = scenario();
        let criteria = FilterCriteria {
            search_text: "   ".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(filter_schools(&schools, &criteria).len(), 3);
    }

    #[test]
    fn sort_is_ordinal_and_stable() {
        let schools = vec![
            school(1, "beta", None, None),
            school(2, "Alpha", None, None),
            school(3, "Alpha", None, None),
            school(4, "Zulu", None, None),
        ];
        let result = filter_schools(&schools, &FilterCriteria::new());
        let ids: Vec<i64> = result.iter().map(|s| s.id).collect();
        // Uppercase sorts before lowercase under ordinal comparison.
        assert_eq!(ids, [2, 3, 4, 1]);
    }

    #[test]
    fn eq_ignore_case_handles_non_ascii() {
        assert!(eq_ignore_case("MĀORI", "māori"));
        assert!(!eq_ignore_case("Maori", "Māori"));
    }

    fn arb_school() -> impl Strategy<Value = School> {
        (
            0i64..50,
            "[A-Za-z ]{0,12}",
            proptest::option::of(prop::sample::select(vec!["Auckland", "Wellington", "Nelson"])),
            proptest::option::of(0.0f64..100.0),
            proptest::option::of(0i32..5),
        )
            .prop_map(|(id, name, city, rate, intl)| School {
                town_city: city.map(str::to_string),
                ncea_pass_rate_2023_year_13: rate,
                international_students: intl,
                ..School::new(id, name)
            })
    }

    proptest! {
        #[test]
        fn unfiltered_returns_every_record_sorted(schools in prop::collection::vec(arb_school(), 0..40)) {
            let result = filter_schools(&schools, &FilterCriteria::new());
            prop_assert_eq!(result.len(), schools.len());
            prop_assert!(result.windows(2).all(|w| w[0].school_name <= w[1].school_name));
        }

        #[test]
        fn filtering_is_deterministic(
            schools in prop::collection::vec(arb_school(), 0..40),
            search in "[a-z]{0,3}",
            achievers in any::<bool>(),
        ) {
            let mut criteria = FilterCriteria { search_text: search, ..FilterCriteria::default() };
            if achievers {
                criteria.toggle(ThresholdFilter::HighAchievers);
            }
            let first: Vec<i64> = filter_schools(&schools, &criteria).iter().map(|s| s.id).collect();
            let second: Vec<i64> = filter_schools(&schools, &criteria).iter().map(|s| s.id).collect();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn category_filter_results_all_carry_the_value(
            schools in prop::collection::vec(arb_school(), 0..40),
            city in prop::sample::select(vec!["auckland", "WELLINGTON", "Nelson", "Dunedin"]),
        ) {
            let mut criteria = FilterCriteria::new();
            criteria.set_category(Category::City, city);
            for s in filter_schools(&schools, &criteria) {
                let field = s.town_city.as_deref();
                prop_assert!(field.is_some_and(|f| eq_ignore_case(f, city)));
            }
        }
    }
}

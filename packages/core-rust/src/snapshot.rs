//! Immutable, versioned record set.
//!
//! A [`SchoolSnapshot`] is what the record feed publishes on every wholesale
//! replace. Its `version` is the record-set identity that derived caches are
//! keyed on: two snapshots with the same version hold the same records.

use std::collections::HashMap;
use std::sync::Arc;

use crate::school::School;

/// A versioned, cheaply clonable collection of school records with an id index.
#[derive(Debug, Clone)]
pub struct SchoolSnapshot {
    version: u64,
    schools: Arc<[School]>,
    index: Arc<HashMap<i64, usize>>,
}

impl Default for SchoolSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl SchoolSnapshot {
    /// Builds a snapshot from `schools`.
    ///
    /// Duplicate ids keep the position of the first occurrence and the
    /// contents of the last one.
    #[must_use]
    pub fn new(version: u64, schools: Vec<School>) -> Self {
        let mut index: HashMap<i64, usize> = HashMap::with_capacity(schools.len());
        let mut deduped: Vec<School> = Vec::with_capacity(schools.len());

        for school in schools {
            if let Some(&pos) = index.get(&school.id) {
                deduped[pos] = school;
            } else {
                index.insert(school.id, deduped.len());
                deduped.push(school);
            }
        }

        Self {
            version,
            schools: deduped.into(),
            index: Arc::new(index),
        }
    }

    /// The empty snapshot published before any records are loaded.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn schools(&self) -> &[School] {
        &self.schools
    }

    /// Shared handle to the records, for consumers that outlive the snapshot.
    #[must_use]
    pub fn shared(&self) -> Arc<[School]> {
        Arc::clone(&self.schools)
    }

    /// Point lookup by school number.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&School> {
        self.index.get(&id).map(|&pos| &self.schools[pos])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }

    /// Most recent `updated_at` across all records (ISO-8601 sorts lexically).
    #[must_use]
    pub fn latest_update(&self) -> Option<&str> {
        self.schools
            .iter()
            .map(|s| s.updated_at.as_str())
            .filter(|ts| !ts.is_empty())
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_version_zero() {
        let snapshot = SchoolSnapshot::empty();
        assert_eq!(snapshot.version(), 0);
        assert!(snapshot.is_empty());
        assert!(snapshot.get(1).is_none());
    }

    #[test]
    fn get_looks_up_by_id() {
        let snapshot = SchoolSnapshot::new(
            3,
            vec![School::new(10, "Ten"), School::new(20, "Twenty")],
        );
        assert_eq!(snapshot.version(), 3);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(20).map(|s| s.school_name.as_str()), Some("Twenty"));
        assert!(snapshot.get(30).is_none());
    }

    #[test]
    fn duplicate_ids_keep_first_position_and_last_contents() {
        let snapshot = SchoolSnapshot::new(
            1,
            vec![
                School::new(1, "Old Name"),
                School::new(2, "Other"),
                School::new(1, "New Name"),
            ],
        );
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.schools()[0].school_name, "New Name");
        assert_eq!(snapshot.schools()[1].school_name, "Other");
        assert_eq!(snapshot.get(1).map(|s| s.school_name.as_str()), Some("New Name"));
    }

    #[test]
    fn latest_update_ignores_blank_timestamps() {
        let mut a = School::new(1, "A");
        a.updated_at = "2024-03-01T00:00:00Z".to_string();
        let mut b = School::new(2, "B");
        b.updated_at = "2024-05-01T00:00:00Z".to_string();
        let c = School::new(3, "C");

        let snapshot = SchoolSnapshot::new(1, vec![a, b, c]);
        assert_eq!(snapshot.latest_update(), Some("2024-05-01T00:00:00Z"));
        assert_eq!(SchoolSnapshot::empty().latest_update(), None);
    }
}

//! In-memory record store and its reactive feed.
//!
//! [`SchoolStore`] holds the current [`SchoolSnapshot`] in a `watch` channel.
//! Every [`SchoolStore::replace_all`] publishes a new snapshot with a bumped
//! version; subscribers always observe whole record sets, never partial ones.

use kuralist_core::{School, SchoolSnapshot, ValidationResult};
use tokio::sync::watch;
use tracing::{info, warn};

/// Holds the full record set and publishes it on every replace.
#[derive(Debug)]
pub struct SchoolStore {
    tx: watch::Sender<SchoolSnapshot>,
}

impl SchoolStore {
    /// Creates a store publishing the empty snapshot (version 0).
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SchoolSnapshot::empty());
        Self { tx }
    }

    /// Returns a feed that yields the current snapshot and every replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SchoolSnapshot> {
        self.tx.subscribe()
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SchoolSnapshot {
        self.tx.borrow().clone()
    }

    /// Point lookup by school number.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<School> {
        self.tx.borrow().get(id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Replaces the whole record set and returns the new snapshot version.
    ///
    /// Records failing validation are kept; each is logged once.
    pub fn replace_all(&self, schools: Vec<School>) -> u64 {
        let invalid = schools
            .iter()
            .filter_map(|school| match school.validate() {
                ValidationResult::Valid => None,
                ValidationResult::Invalid { errors } => {
                    warn!(id = school.id, ?errors, "ingesting invalid school record");
                    Some(())
                }
            })
            .count();

        let count = schools.len();
        let mut version = 0;
        self.tx.send_modify(|snapshot| {
            version = snapshot.version() + 1;
            *snapshot = SchoolSnapshot::new(version, schools);
        });

        info!(version, count, invalid, "replaced school records");
        version
    }
}

impl Default for SchoolStore {
    fn default() -> Self {
        Self::new()
    }
}

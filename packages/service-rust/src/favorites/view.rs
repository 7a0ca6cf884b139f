//! Favorite schools as a reactive list.

use std::sync::Arc;

use kuralist_core::{select_favorites, FavoriteIds, School, SchoolSnapshot};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Combines the record feed and the favorites feed into the list of
/// favorite records, sorted by name.
///
/// The task ends once both inputs have closed, or on drop.
#[derive(Debug)]
pub struct FavoritesView {
    rx: watch::Receiver<Arc<[School]>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

fn select(snapshot: &SchoolSnapshot, ids: &FavoriteIds) -> Arc<[School]> {
    select_favorites(snapshot.schools(), ids)
        .into_iter()
        .cloned()
        .collect()
}

impl FavoritesView {
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn spawn(
        mut records: watch::Receiver<SchoolSnapshot>,
        mut favorites: watch::Receiver<FavoriteIds>,
    ) -> Self {
        let initial = select(&records.borrow_and_update(), &favorites.borrow_and_update());
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            let mut records_open = true;
            let mut favorites_open = true;
            while records_open || favorites_open {
                tokio::select! {
                    changed = records.changed(), if records_open => {
                        records_open = changed.is_ok();
                    }
                    changed = favorites.changed(), if favorites_open => {
                        favorites_open = changed.is_ok();
                    }
                }
                let list = select(&records.borrow_and_update(), &favorites.borrow_and_update());
                debug!(count = list.len(), "favorite schools updated");
                tx.send_if_modified(|current| {
                    if **current == *list {
                        false
                    } else {
                        *current = list;
                        true
                    }
                });
            }
        });

        Self {
            rx,
            task: Mutex::new(Some(task)),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<[School]>> {
        self.rx.clone()
    }

    #[must_use]
    pub fn current(&self) -> Arc<[School]> {
        Arc::clone(&self.rx.borrow())
    }

    /// Stops the combining task. The last list stays readable.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

impl Drop for FavoritesView {
    fn drop(&mut self) {
        self.stop();
    }
}

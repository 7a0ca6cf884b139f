//! Loading the record store from the local cache and the remote table.
//!
//! [`SyncService`] is the only writer of the [`SchoolStore`]. It exposes a
//! [`SyncStatus`] that presentation renders as a loading/error state; that
//! state is independent of filtering, which keeps running over whatever
//! snapshot the store last published.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::store::SchoolStore;
use crate::traits::{RemoteSchoolSource, SchoolCache};

/// Loading state of the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SyncStatus {
    /// No load in progress; the last one (if any) succeeded.
    Idle,
    /// A remote sync is in progress.
    Loading,
    /// The last load failed. The previous snapshot is still served.
    Failed(String),
}

/// Errors surfaced by [`SyncService`].
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("no remote source configured")]
    NoRemote,
    #[error("fetching remote page at offset {offset} failed")]
    Remote {
        offset: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("reading local cache failed")]
    CacheRead(#[source] anyhow::Error),
}

/// Fills the store from the cache and the remote source.
pub struct SyncService {
    store: Arc<SchoolStore>,
    cache: Arc<dyn SchoolCache>,
    remote: Option<Arc<dyn RemoteSchoolSource>>,
    config: SyncConfig,
    status: ArcSwap<SyncStatus>,
}

impl SyncService {
    #[must_use]
    pub fn new(
        store: Arc<SchoolStore>,
        cache: Arc<dyn SchoolCache>,
        remote: Option<Arc<dyn RemoteSchoolSource>>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            cache,
            remote,
            config,
            status: ArcSwap::from_pointee(SyncStatus::Idle),
        }
    }

    /// Current loading state.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        SyncStatus::clone(&self.status.load())
    }

    fn set_status(&self, status: SyncStatus) {
        self.status.store(Arc::new(status));
    }

    /// Publishes the cached records, if any. Returns how many were loaded.
    ///
    /// An empty cache leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::CacheRead`] if the cache cannot be read.
    pub async fn load_local(&self) -> Result<usize, SyncError> {
        let schools = match self.cache.load_all().await {
            Ok(schools) => schools,
            Err(err) => {
                self.set_status(SyncStatus::Failed(format!("{err:#}")));
                return Err(SyncError::CacheRead(err));
            }
        };
        let count = schools.len();
        if count > 0 {
            self.store.replace_all(schools);
        }
        info!(count, "loaded schools from local cache");
        Ok(count)
    }

    /// Pulls the whole remote table page by page and replaces the store.
    ///
    /// Paging stops at the first page shorter than the batch size. On
    /// failure nothing is replaced. A cache write failure is logged and does
    /// not fail the sync: the fresh records are still published.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoRemote`] without a remote source, or
    /// [`SyncError::Remote`] if any page fails.
    pub async fn resync(&self) -> Result<usize, SyncError> {
        let Some(remote) = &self.remote else {
            return Err(SyncError::NoRemote);
        };
        let batch_size = self.config.batch_size.max(1);

        self.set_status(SyncStatus::Loading);
        let mut schools = Vec::new();
        let mut offset = 0;
        loop {
            let page = match remote.fetch_page(offset, batch_size).await {
                Ok(page) => page,
                Err(err) => {
                    warn!(offset, error = %format!("{err:#}"), "remote sync failed");
                    self.set_status(SyncStatus::Failed(format!("{err:#}")));
                    return Err(SyncError::Remote {
                        offset,
                        source: err,
                    });
                }
            };
            let fetched = page.len();
            schools.extend(page);
            if fetched < batch_size {
                break;
            }
            offset += batch_size;
        }

        if let Err(err) = self.cache.store_all(&schools).await {
            warn!(error = %format!("{err:#}"), "writing local cache failed");
        }

        let count = schools.len();
        self.store.replace_all(schools);
        self.set_status(SyncStatus::Idle);
        info!(count, "synchronised schools from remote");
        Ok(count)
    }

    /// Loads the cache first and falls back to the remote only when the
    /// store is still empty. Returns the number of records in the store.
    ///
    /// An unreadable cache counts as an empty one when a remote is
    /// configured.
    ///
    /// # Errors
    ///
    /// Propagates remote failures, and cache failures when there is no
    /// remote to fall back to. A missing remote is not an error otherwise:
    /// the store simply stays empty.
    pub async fn ensure_loaded(&self) -> Result<usize, SyncError> {
        if self.store.is_empty() {
            match self.load_local().await {
                Ok(_) => {}
                Err(err) if self.remote.is_some() => {
                    warn!(error = %format!("{:#}", anyhow::Error::from(err)), "falling back to remote");
                }
                Err(err) => return Err(err),
            }
        }
        if self.store.is_empty() && self.remote.is_some() {
            self.resync().await?;
        }
        Ok(self.store.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use kuralist_core::School;
    use parking_lot::Mutex;

    use super::*;
    use crate::cache::NullSchoolCache;

    /// Remote serving `total` sequential records, optionally failing at one offset.
    struct FakeRemote {
        total: usize,
        fail_at: Option<usize>,
        calls: Mutex<Vec<(usize, usize)>>,
    }

    impl FakeRemote {
        fn new(total: usize) -> Self {
            Self {
                total,
                fail_at: None,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RemoteSchoolSource for FakeRemote {
        async fn fetch_page(&self, offset: usize, limit: usize) -> anyhow::Result<Vec<School>> {
            self.calls.lock().push((offset, limit));
            if self.fail_at == Some(offset) {
                anyhow::bail!("connection reset");
            }
            let end = (offset + limit).min(self.total);
            Ok((offset..end)
                .map(|i| School::new(i64::try_from(i).unwrap(), format!("School {i}")))
                .collect())
        }
    }

    /// Cache that records writes and can be preloaded.
    #[derive(Default)]
    struct RecordingCache {
        contents: Mutex<Vec<School>>,
        writes: AtomicUsize,
        fail_reads: bool,
        fail_writes: bool,
    }

    #[async_trait]
    impl SchoolCache for RecordingCache {
        async fn load_all(&self) -> anyhow::Result<Vec<School>> {
            if self.fail_reads {
                anyhow::bail!("parsing schools.json");
            }
            Ok(self.contents.lock().clone())
        }

        async fn store_all(&self, schools: &[School]) -> anyhow::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                anyhow::bail!("disk full");
            }
            *self.contents.lock() = schools.to_vec();
            Ok(())
        }

        async fn clear(&self) -> anyhow::Result<()> {
            self.contents.lock().clear();
            Ok(())
        }
    }

    fn config(batch_size: usize) -> SyncConfig {
        SyncConfig {
            batch_size,
            ..SyncConfig::default()
        }
    }

    #[tokio::test]
    async fn resync_pages_until_a_short_page() {
        let store = Arc::new(SchoolStore::new());
        let remote = Arc::new(FakeRemote::new(25));
        let cache = Arc::new(RecordingCache::default());
        let sync = SyncService::new(
            Arc::clone(&store),
            cache.clone(),
            Some(remote.clone()),
            config(10),
        );

        assert_eq!(sync.resync().await.unwrap(), 25);
        assert_eq!(*remote.calls.lock(), [(0, 10), (10, 10), (20, 10)]);
        assert_eq!(store.len(), 25);
        assert_eq!(cache.contents.lock().len(), 25);
        assert_eq!(sync.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn exact_multiple_requests_one_empty_page() {
        let remote = Arc::new(FakeRemote::new(20));
        let sync = SyncService::new(
            Arc::new(SchoolStore::new()),
            Arc::new(NullSchoolCache),
            Some(remote.clone()),
            config(10),
        );

        assert_eq!(sync.resync().await.unwrap(), 20);
        assert_eq!(remote.calls.lock().len(), 3);
    }

    #[tokio::test]
    async fn failed_page_keeps_previous_snapshot() {
        let store = Arc::new(SchoolStore::new());
        store.replace_all(vec![School::new(99, "Existing")]);
        let remote = Arc::new(FakeRemote {
            fail_at: Some(10),
            ..FakeRemote::new(25)
        });
        let sync = SyncService::new(
            Arc::clone(&store),
            Arc::new(NullSchoolCache),
            Some(remote),
            config(10),
        );

        let err = sync.resync().await.unwrap_err();
        assert!(matches!(err, SyncError::Remote { offset: 10, .. }));
        assert_eq!(store.len(), 1);
        assert!(store.get(99).is_some());
        assert_eq!(sync.status(), SyncStatus::Failed("connection reset".to_string()));
    }

    #[tokio::test]
    async fn cache_write_failure_still_publishes() {
        let store = Arc::new(SchoolStore::new());
        let cache = Arc::new(RecordingCache {
            fail_writes: true,
            ..RecordingCache::default()
        });
        let sync = SyncService::new(
            Arc::clone(&store),
            cache.clone(),
            Some(Arc::new(FakeRemote::new(3))),
            config(10),
        );

        assert_eq!(sync.resync().await.unwrap(), 3);
        assert_eq!(store.len(), 3);
        assert_eq!(cache.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resync_without_remote_is_an_error() {
        let sync = SyncService::new(
            Arc::new(SchoolStore::new()),
            Arc::new(NullSchoolCache),
            None,
            SyncConfig::default(),
        );
        assert!(matches!(sync.resync().await, Err(SyncError::NoRemote)));
        assert_eq!(sync.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn ensure_loaded_prefers_cache() {
        let store = Arc::new(SchoolStore::new());
        let cache = Arc::new(RecordingCache::default());
        cache.contents.lock().push(School::new(1, "Cached"));
        let remote = Arc::new(FakeRemote::new(5));
        let sync = SyncService::new(
            Arc::clone(&store),
            cache,
            Some(remote.clone()),
            SyncConfig::default(),
        );

        assert_eq!(sync.ensure_loaded().await.unwrap(), 1);
        assert!(remote.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn ensure_loaded_falls_back_to_remote() {
        let store = Arc::new(SchoolStore::new());
        let remote = Arc::new(FakeRemote::new(5));
        let sync = SyncService::new(
            Arc::clone(&store),
            Arc::new(RecordingCache::default()),
            Some(remote.clone()),
            SyncConfig::default(),
        );

        assert_eq!(sync.ensure_loaded().await.unwrap(), 5);
        assert_eq!(remote.calls.lock().len(), 1);
    }

    #[test]
    fn status_serializes_for_presentation() {
        assert_eq!(
            serde_json::to_string(&SyncStatus::Loading).unwrap(),
            r#"{"state":"loading"}"#
        );
        assert_eq!(
            serde_json::to_string(&SyncStatus::Failed("offline".to_string())).unwrap(),
            r#"{"state":"failed","message":"offline"}"#
        );
    }

    #[tokio::test]
    async fn ensure_loaded_skips_unreadable_cache_when_remote_exists() {
        let store = Arc::new(SchoolStore::new());
        let remote = Arc::new(FakeRemote::new(1));
        let cache = Arc::new(RecordingCache {
            fail_reads: true,
            ..RecordingCache::default()
        });
        let sync = SyncService::new(
            Arc::clone(&store),
            cache,
            Some(remote.clone()),
            SyncConfig::default(),
        );

        assert_eq!(sync.ensure_loaded().await.unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(remote.calls.lock().len(), 1);
        assert_eq!(sync.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn ensure_loaded_reports_unreadable_cache_without_remote() {
        let sync = SyncService::new(
            Arc::new(SchoolStore::new()),
            Arc::new(RecordingCache {
                fail_reads: true,
                ..RecordingCache::default()
            }),
            None,
            SyncConfig::default(),
        );

        let err = sync.ensure_loaded().await.unwrap_err();
        assert!(matches!(err, SyncError::CacheRead(_)));
        assert_eq!(
            sync.status(),
            SyncStatus::Failed("parsing schools.json".to_string())
        );
    }

    #[test]
    fn remote_error_names_its_cause_once() {
        let err = anyhow::Error::from(SyncError::Remote {
            offset: 1000,
            source: anyhow::anyhow!("connection reset"),
        });
        assert_eq!(
            format!("{err:#}"),
            "fetching remote page at offset 1000 failed: connection reset"
        );
    }

    #[tokio::test]
    async fn ensure_loaded_without_any_source_stays_empty() {
        let sync = SyncService::new(
            Arc::new(SchoolStore::new()),
            Arc::new(NullSchoolCache),
            None,
            SyncConfig::default(),
        );
        assert_eq!(sync.ensure_loaded().await.unwrap(), 0);
    }
}

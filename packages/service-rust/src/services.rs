//! Explicitly constructed service graph.
//!
//! [`Services`] owns one record store, the sync service writing to it, a
//! single shared [`FilterEngine`] and the favorites list. Presentation code
//! receives it (or the parts it needs) by injection; nothing is global.

use std::sync::Arc;

use tracing::info;

use crate::cache::{JsonFileCache, NullSchoolCache};
use crate::config::ServiceConfig;
use crate::engine::FilterEngine;
use crate::favorites::{FavoritesView, JsonFileFavorites, MemoryFavorites};
use crate::remote::RestSchoolSource;
use crate::store::SchoolStore;
use crate::sync::SyncService;
use crate::traits::{FavoritesStore, RemoteSchoolSource, SchoolCache};

/// Every long-lived component of a Kuralist process.
pub struct Services {
    pub store: Arc<SchoolStore>,
    pub sync: Arc<SyncService>,
    pub engine: FilterEngine,
    pub favorites: Arc<dyn FavoritesStore>,
    pub favorite_schools: FavoritesView,
}

impl Services {
    /// Wires the given collaborators together. Must be called within a
    /// tokio runtime.
    #[must_use]
    pub fn new(
        config: &ServiceConfig,
        cache: Arc<dyn SchoolCache>,
        remote: Option<Arc<dyn RemoteSchoolSource>>,
        favorites: Arc<dyn FavoritesStore>,
    ) -> Self {
        let store = Arc::new(SchoolStore::new());
        let sync = Arc::new(SyncService::new(
            Arc::clone(&store),
            cache,
            remote,
            config.sync.clone(),
        ));
        let engine = FilterEngine::spawn(config.engine.clone(), store.subscribe());
        let favorite_schools = FavoritesView::spawn(store.subscribe(), favorites.subscribe());

        Self {
            store,
            sync,
            engine,
            favorites,
            favorite_schools,
        }
    }

    /// Builds the collaborators described by `config` and wires them.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or an existing
    /// favorites file cannot be read.
    pub async fn build(config: &ServiceConfig) -> anyhow::Result<Self> {
        let cache: Arc<dyn SchoolCache> = match &config.cache_path {
            Some(path) => Arc::new(JsonFileCache::new(path)),
            None => Arc::new(NullSchoolCache),
        };
        let remote: Option<Arc<dyn RemoteSchoolSource>> = match &config.remote {
            Some(remote) => Some(Arc::new(RestSchoolSource::new(
                remote.clone(),
                config.sync.table.clone(),
            )?)),
            None => None,
        };
        let favorites: Arc<dyn FavoritesStore> = match &config.favorites_path {
            Some(path) => Arc::new(JsonFileFavorites::open(path).await?),
            None => Arc::new(MemoryFavorites::new()),
        };

        info!(
            cache = config.cache_path.is_some(),
            remote = remote.is_some(),
            persistent_favorites = config.favorites_path.is_some(),
            "services built"
        );
        Ok(Self::new(config, cache, remote, favorites))
    }

    /// Stops the background tasks.
    pub async fn shutdown(&self) {
        self.engine.shutdown().await;
        self.favorite_schools.stop();
        info!("services stopped");
    }
}

use async_trait::async_trait;
use kuralist_core::{FavoriteIds, School};
use tokio::sync::watch;

/// Local on-device copy of the full record set.
/// Implementations: JSON file, null (tests and ephemeral runs).
#[async_trait]
pub trait SchoolCache: Send + Sync {
    /// Load every cached record. An absent cache is an empty one.
    async fn load_all(&self) -> anyhow::Result<Vec<School>>;

    /// Replace the cached records with `schools`.
    async fn store_all(&self, schools: &[School]) -> anyhow::Result<()>;

    /// Remove every cached record.
    async fn clear(&self) -> anyhow::Result<()>;
}

/// Paged read access to the remote `schools` table.
#[async_trait]
pub trait RemoteSchoolSource: Send + Sync {
    /// Fetch up to `limit` records starting at row `offset`.
    async fn fetch_page(&self, offset: usize, limit: usize) -> anyhow::Result<Vec<School>>;
}

/// Persistent set of favorite school numbers with a change feed.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Current favorites.
    fn ids(&self) -> FavoriteIds;

    /// Feed re-emitted after every change.
    fn subscribe(&self) -> watch::Receiver<FavoriteIds>;

    /// Flip `id` and return whether it is now a favorite.
    async fn toggle(&self, id: i64) -> anyhow::Result<bool>;

    async fn add(&self, id: i64) -> anyhow::Result<()>;

    async fn remove(&self, id: i64) -> anyhow::Result<()>;

    /// Remove every favorite.
    async fn clear(&self) -> anyhow::Result<()>;
}

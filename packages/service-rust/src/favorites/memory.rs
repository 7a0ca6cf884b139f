//! In-memory [`FavoritesStore`].

use async_trait::async_trait;
use kuralist_core::FavoriteIds;
use tokio::sync::watch;

use crate::traits::FavoritesStore;

/// Favorites that live as long as the process.
#[derive(Debug)]
pub struct MemoryFavorites {
    tx: watch::Sender<FavoriteIds>,
}

impl MemoryFavorites {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ids(FavoriteIds::new())
    }

    #[must_use]
    pub fn with_ids(ids: FavoriteIds) -> Self {
        let (tx, _rx) = watch::channel(ids);
        Self { tx }
    }
}

impl Default for MemoryFavorites {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FavoritesStore for MemoryFavorites {
    fn ids(&self) -> FavoriteIds {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<FavoriteIds> {
        self.tx.subscribe()
    }

    async fn toggle(&self, id: i64) -> anyhow::Result<bool> {
        let mut now_favorite = false;
        self.tx.send_modify(|ids| {
            now_favorite = ids.insert(id);
            if !now_favorite {
                ids.remove(&id);
            }
        });
        Ok(now_favorite)
    }

    async fn add(&self, id: i64) -> anyhow::Result<()> {
        self.tx.send_if_modified(|ids| ids.insert(id));
        Ok(())
    }

    async fn remove(&self, id: i64) -> anyhow::Result<()> {
        self.tx.send_if_modified(|ids| ids.remove(&id));
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.tx.send_if_modified(|ids| {
            let changed = !ids.is_empty();
            ids.clear();
            changed
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn is_object_safe() {
        let _store: Arc<dyn FavoritesStore> = Arc::new(MemoryFavorites::new());
    }

    #[tokio::test]
    async fn toggle_flips_membership() {
        let favorites = MemoryFavorites::new();
        assert!(favorites.toggle(7).await.unwrap());
        assert!(favorites.ids().contains(&7));
        assert!(!favorites.toggle(7).await.unwrap());
        assert!(favorites.ids().is_empty());
    }

    #[tokio::test]
    async fn redundant_changes_do_not_notify() {
        let favorites = MemoryFavorites::with_ids(FavoriteIds::from([1]));
        let mut feed = favorites.subscribe();

        favorites.add(1).await.unwrap();
        favorites.remove(2).await.unwrap();
        assert!(!feed.has_changed().unwrap());

        favorites.add(2).await.unwrap();
        assert!(feed.has_changed().unwrap());
        assert_eq!(*feed.borrow_and_update(), FavoriteIds::from([1, 2]));

        favorites.clear().await.unwrap();
        favorites.clear().await.unwrap();
        feed.changed().await.unwrap();
        assert!(feed.borrow_and_update().is_empty());
        assert!(!feed.has_changed().unwrap());
    }
}

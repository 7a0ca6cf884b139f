//! [`FavoritesStore`] persisted as a JSON array of school numbers.
//!
//! Every change is written to disk before it is published, so subscribers
//! never see a favorite that failed to persist.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use kuralist_core::FavoriteIds;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::cache::json_file::write_atomically;
use crate::traits::FavoritesStore;

/// File-backed favorites.
#[derive(Debug)]
pub struct JsonFileFavorites {
    path: PathBuf,
    tx: watch::Sender<FavoriteIds>,
    /// Serializes read-modify-write cycles across concurrent callers.
    write: Mutex<()>,
}

impl JsonFileFavorites {
    /// Opens `path`, loading any favorites already stored there. A missing
    /// file starts empty and is created on the first change.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let ids = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<FavoriteIds>(&bytes)
                .with_context(|| format!("parsing {}", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => FavoriteIds::new(),
            Err(err) => return Err(err).with_context(|| format!("reading {}", path.display())),
        };
        debug!(path = %path.display(), count = ids.len(), "opened favorites");
        let (tx, _rx) = watch::channel(ids);
        Ok(Self {
            path,
            tx,
            write: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the current set, persists it and
    /// publishes it. Returns `change`'s result. Nothing is written when the
    /// set is unchanged.
    async fn update<R>(&self, change: impl FnOnce(&mut FavoriteIds) -> R) -> anyhow::Result<R> {
        let _guard = self.write.lock().await;
        let mut ids = self.tx.borrow().clone();
        let result = change(&mut ids);
        if ids == *self.tx.borrow() {
            return Ok(result);
        }

        let bytes = serde_json::to_vec(&ids).context("serializing favorites")?;
        write_atomically(&self.path, &bytes).await?;

        self.tx.send_replace(ids);
        Ok(result)
    }
}

#[async_trait]
impl FavoritesStore for JsonFileFavorites {
    fn ids(&self) -> FavoriteIds {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<FavoriteIds> {
        self.tx.subscribe()
    }

    async fn toggle(&self, id: i64) -> anyhow::Result<bool> {
        self.update(|ids| {
            if ids.remove(&id) {
                false
            } else {
                ids.insert(id);
                true
            }
        })
        .await
    }

    async fn add(&self, id: i64) -> anyhow::Result<()> {
        self.update(|ids| {
            ids.insert(id);
        })
        .await
    }

    async fn remove(&self, id: i64) -> anyhow::Result<()> {
        self.update(|ids| {
            ids.remove(&id);
        })
        .await
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.update(FavoriteIds::clear).await
    }
}

//! [`SchoolCache`] backed by a single JSON file.
//!
//! The file holds a JSON array of records in the remote row shape. Writes go
//! to a sibling temporary file which is then renamed over the target, so a
//! crash mid-write leaves the previous snapshot intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use kuralist_core::School;
use tracing::debug;

use crate::traits::SchoolCache;

/// JSON file cache of the full record set.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        temp_path_for(&self.path)
    }
}

/// Sibling of `path` used while a new version is being written.
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `bytes` to `path` through [`temp_path_for`] and a rename.
pub(crate) async fn write_atomically(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let temp = temp_path_for(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(&temp, bytes)
        .await
        .with_context(|| format!("writing {}", temp.display()))?;
    tokio::fs::rename(&temp, path)
        .await
        .with_context(|| format!("renaming {} to {}", temp.display(), path.display()))?;
    Ok(())
}

#[async_trait]
impl SchoolCache for JsonFileCache {
    async fn load_all(&self) -> anyhow::Result<Vec<School>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        let schools: Vec<School> = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        debug!(path = %self.path.display(), count = schools.len(), "loaded cached schools");
        Ok(schools)
    }

    async fn store_all(&self, schools: &[School]) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec(schools).context("serializing schools")?;
        write_atomically(&self.path, &bytes).await?;
        debug!(path = %self.path.display(), count = schools.len(), "stored schools");
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

//! No-op [`SchoolCache`] implementation.
//!
//! [`NullSchoolCache`] discards all writes and loads nothing. Used when no
//! cache path is configured and in tests that exercise only the remote path.

use async_trait::async_trait;
use kuralist_core::School;

use crate::traits::SchoolCache;

/// No-op `SchoolCache` for ephemeral runs.
pub struct NullSchoolCache;

#[async_trait]
impl SchoolCache for NullSchoolCache {
    async fn load_all(&self) -> anyhow::Result<Vec<School>> {
        Ok(Vec::new())
    }

    async fn store_all(&self, _schools: &[School]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

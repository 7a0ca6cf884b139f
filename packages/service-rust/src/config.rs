//! Configuration types for the Kuralist service.

use std::path::PathBuf;
use std::time::Duration;

/// Filter engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Quiet period search text must hold before it is applied.
    /// Zero applies every keystroke immediately.
    pub search_debounce: Duration,
    /// Whether to compute every category's option list as soon as a new
    /// record set arrives, rather than on first request.
    pub warm_option_cache: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(300),
            warm_option_cache: true,
        }
    }
}

/// Remote sync configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Rows requested per page. A shorter page ends the sync.
    pub batch_size: usize,
    /// Remote table name.
    pub table: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            table: "schools".to_string(),
        }
    }
}

/// Connection settings for the remote REST endpoint.
///
/// No `Default` impl because the endpoint and key have no sensible defaults.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project base URL, e.g. `https://example.supabase.co`.
    pub base_url: String,
    /// Anonymous API key sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl RemoteConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Top-level configuration wiring every service together.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub engine: EngineConfig,
    pub sync: SyncConfig,
    /// Remote source. `None` runs from the local cache only.
    pub remote: Option<RemoteConfig>,
    /// Local snapshot file. `None` keeps no local copy.
    pub cache_path: Option<PathBuf>,
    /// Favorites file. `None` keeps favorites in memory only.
    pub favorites_path: Option<PathBuf>,
}

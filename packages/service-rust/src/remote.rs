//! REST client for the remote `schools` table (PostgREST dialect).

use anyhow::Context;
use async_trait::async_trait;
use kuralist_core::School;
use reqwest::Url;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::traits::RemoteSchoolSource;

/// Reads pages of the `schools` table over HTTP.
#[derive(Debug, Clone)]
pub struct RestSchoolSource {
    client: reqwest::Client,
    config: RemoteConfig,
    table: String,
}

impl RestSchoolSource {
    /// Builds a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: RemoteConfig, table: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            config,
            table: table.into(),
        })
    }

    /// URL for one page, ordered by school number so pages are stable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is not a valid URL.
    pub fn page_url(&self, offset: usize, limit: usize) -> anyhow::Result<Url> {
        let mut base = self.config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let mut url = Url::parse(&base)
            .with_context(|| format!("invalid remote base URL: {}", self.config.base_url))?
            .join(&format!("rest/v1/{}", self.table))
            .context("building table URL")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "school_number.asc")
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }
}

#[async_trait]
impl RemoteSchoolSource for RestSchoolSource {
    async fn fetch_page(&self, offset: usize, limit: usize) -> anyhow::Result<Vec<School>> {
        let url = self.page_url(offset, limit)?;
        debug!(%url, "fetching school page");
        let schools = self
            .client
            .get(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .context("sending page request")?
            .error_for_status()
            .context("remote returned an error status")?
            .json::<Vec<School>>()
            .await
            .context("decoding page body")?;
        Ok(schools)
    }
}

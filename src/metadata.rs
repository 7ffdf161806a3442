//! Song enrichment from an external data API
//!
//! The API answers `GET <base>/info?group=..&song=..` with
//! `{"release_date": "..", "text": "..", "link": ".."}`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::song::SongExtra;

pub const INFO_PATH: &str = "/info";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Network error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status code: {0}")]
    Status(StatusCode),

    #[error("JSON parsing error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of enrichment data for newly created songs
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Look up release date, lyrics and link for a song of a group
    async fn fetch_extra(&self, song: &str, group: &str) -> Result<SongExtra, MetadataError>;
}

/// Configuration for [`ExtraDataApiProvider`]
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base address, `/info` is appended
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct ExtraDataApiProvider {
    client: Client,
    info_url: String,
}

impl ExtraDataApiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, MetadataError> {
        let info_url = format!("{}{}", config.base_url.trim_end_matches('/'), INFO_PATH);
        tracing::info!("Using extra data API at {}", info_url);

        Ok(Self {
            client: Client::builder().timeout(config.timeout).build()?,
            info_url,
        })
    }
}

#[async_trait]
impl MetadataProvider for ExtraDataApiProvider {
    #[tracing::instrument(skip(self))]
    async fn fetch_extra(&self, song: &str, group: &str) -> Result<SongExtra, MetadataError> {
        let response = self
            .client
            .get(&self.info_url)
            .query(&[("group", group), ("song", song)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status));
        }

        let body = response.bytes().await?;
        let extra: SongExtra = serde_json::from_slice(&body)?;

        tracing::debug!("Got extra data, release date '{}'", extra.release_date);
        Ok(extra)
    }
}

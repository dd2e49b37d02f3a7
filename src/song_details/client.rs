//! HTTP client for the external song-detail service.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::models::SongDetail;
use super::{SongDetailError, SongDetailProvider};

pub struct SongDetailClient {
    client: reqwest::Client,
    base_url: String,
}

impl SongDetailClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the lookup service (e.g., "http://localhost:8081")
    /// * `timeout` - Whole-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn info_url(&self, group: &str, song: &str) -> String {
        format!(
            "{}/info?group={}&song={}",
            self.base_url,
            urlencoding::encode(group),
            urlencoding::encode(song)
        )
    }
}

#[async_trait]
impl SongDetailProvider for SongDetailClient {
    async fn fetch_details(&self, group: &str, song: &str) -> Result<SongDetail, SongDetailError> {
        let url = self.info_url(group, song);
        debug!("Fetching song details from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(SongDetailError::Request)?;

        if !response.status().is_success() {
            return Err(SongDetailError::Status(response.status()));
        }

        response.json().await.map_err(SongDetailError::Decode)
    }
}

//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all song catalog endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // System Endpoints
    // ========================================================================

    /// GET /healthcheck
    pub async fn healthcheck(&self) -> Response {
        self.client
            .get(format!("{}/healthcheck", self.base_url))
            .send()
            .await
            .expect("Healthcheck request failed")
    }

    // ========================================================================
    // Song Endpoints
    // ========================================================================

    /// GET /songs with raw query pairs, e.g. `&[("group", "Muse")]`
    pub async fn list_songs(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/songs", self.base_url))
            .query(query)
            .send()
            .await
            .expect("List songs request failed")
    }

    /// POST /songs
    pub async fn create_song(&self, group: &str, song: &str) -> Response {
        self.client
            .post(format!("{}/songs", self.base_url))
            .json(&json!({ "group": group, "song": song }))
            .send()
            .await
            .expect("Create song request failed")
    }

    /// GET /songs/{id}
    pub async fn get_song(&self, id: i64) -> Response {
        self.client
            .get(format!("{}/songs/{}", self.base_url, id))
            .send()
            .await
            .expect("Get song request failed")
    }

    /// PUT /songs/{id} with an arbitrary JSON body
    pub async fn update_song(&self, id: i64, body: Value) -> Response {
        self.client
            .put(format!("{}/songs/{}", self.base_url, id))
            .json(&body)
            .send()
            .await
            .expect("Update song request failed")
    }

    /// DELETE /songs/{id}
    pub async fn delete_song(&self, id: i64) -> Response {
        self.client
            .delete(format!("{}/songs/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete song request failed")
    }

    /// GET /songs/{id}/lyrics with raw query pairs
    pub async fn get_lyrics(&self, id: i64, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/songs/{}/lyrics", self.base_url, id))
            .query(query)
            .send()
            .await
            .expect("Get lyrics request failed")
    }
}

//! Lookup of release date, lyrics and link for a (group, song) pair.

mod client;
pub mod mock;
mod models;

pub use client::SongDetailClient;
pub use models::SongDetail;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SongDetailError {
    #[error("song detail request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("song detail service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid song detail response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Source of the details attached to a newly created song.
#[async_trait]
pub trait SongDetailProvider: Send + Sync {
    async fn fetch_details(&self, group: &str, song: &str) -> Result<SongDetail, SongDetailError>;
}

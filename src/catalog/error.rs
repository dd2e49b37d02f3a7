use std::time::Duration;
use thiserror::Error;

use crate::song_details::SongDetailError;
use crate::song_store::{SongStoreError, ValidationErrors};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("record not found")]
    NotFound,

    #[error("edit conflict")]
    EditConflict,

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("song detail lookup failed: {0}")]
    ExternalLookupFailed(#[from] SongDetailError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<SongStoreError> for CatalogError {
    fn from(err: SongStoreError) -> Self {
        match err {
            SongStoreError::NotFound => CatalogError::NotFound,
            SongStoreError::EditConflict => CatalogError::EditConflict,
            SongStoreError::Timeout(timeout) => CatalogError::Timeout(timeout),
            SongStoreError::Unavailable(reason) => CatalogError::StoreUnavailable(reason),
        }
    }
}

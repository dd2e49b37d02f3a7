use rusqlite::ErrorCode;
use std::time::Duration;
use thiserror::Error;

/// Failures of a song store operation.
#[derive(Debug, Error)]
pub enum SongStoreError {
    /// No song with the given id, or the id can never exist (`< 1`).
    #[error("record not found")]
    NotFound,

    /// The version supplied with an update is not the stored one. A song
    /// deleted since it was read reports this as well.
    #[error("edit conflict")]
    EditConflict,

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type SongStoreResult<T> = Result<T, SongStoreError>;

impl SongStoreError {
    /// Maps a SQLite failure of an operation bounded by `timeout`.
    ///
    /// An interrupted statement (deadline hit) and a lock wait that outlived
    /// the busy timeout both count as a timeout.
    pub fn from_sqlite(err: rusqlite::Error, timeout: Duration) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::OperationInterrupted)
            | Some(ErrorCode::DatabaseBusy)
            | Some(ErrorCode::DatabaseLocked) => SongStoreError::Timeout(timeout),
            _ => SongStoreError::Unavailable(err.to_string()),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SongStoreError::NotFound => "not_found",
            SongStoreError::EditConflict => "edit_conflict",
            SongStoreError::Timeout(_) => "timeout",
            SongStoreError::Unavailable(_) => "unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn test_interrupt_and_busy_are_timeouts() {
        let timeout = Duration::from_secs(3);
        for code in [ffi::SQLITE_INTERRUPT, ffi::SQLITE_BUSY, ffi::SQLITE_LOCKED] {
            assert!(matches!(
                SongStoreError::from_sqlite(sqlite_failure(code), timeout),
                SongStoreError::Timeout(t) if t == timeout
            ));
        }
    }

    #[test]
    fn test_other_failures_are_unavailable() {
        let err = SongStoreError::from_sqlite(
            sqlite_failure(ffi::SQLITE_CANTOPEN),
            Duration::from_secs(3),
        );
        assert_eq!(err.kind(), "unavailable");

        let err =
            SongStoreError::from_sqlite(rusqlite::Error::InvalidQuery, Duration::from_secs(3));
        assert!(matches!(err, SongStoreError::Unavailable(_)));
    }
}

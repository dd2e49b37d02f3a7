//! Song records as stored in and returned from the catalog database.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::metadata::Metadata;

/// A persisted song.
///
/// `id`, `created_at` and `version` are assigned by the store. The wire
/// names match the public API: the title is exposed as `name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Song {
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    pub group: String,
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub text: String,
    pub link: String,
    pub version: i32,
}

/// Caller-supplied fields of a song about to be inserted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewSong {
    pub group: String,
    pub title: String,
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// Title and group filters of a listing request. Empty strings match
/// everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SongQuery {
    pub name: String,
    pub group: String,
}

impl SongQuery {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
        }
    }
}

/// One page of a listing plus the summary of the whole result set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SongPage {
    pub songs: Vec<Song>,
    pub metadata: Metadata,
}

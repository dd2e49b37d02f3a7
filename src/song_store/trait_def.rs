//! SongStore trait definition.

use super::error::SongStoreResult;
use super::filters::FilterSpec;
use super::lyrics::LyricsPage;
use super::models::{NewSong, Song, SongPage, SongQuery};

/// Persistence of song records.
///
/// Implementations bound every call by a deadline and never retry.
pub trait SongStore: Send + Sync {
    /// Insert a new song. The store assigns id, creation time and version 1.
    fn insert_song(&self, song: &NewSong) -> SongStoreResult<Song>;

    /// Get a song by id.
    fn get_song(&self, id: i64) -> SongStoreResult<Song>;

    /// List the songs matching `query`, one page at a time.
    ///
    /// No matches is an empty page with zero metadata, not an error.
    fn list_songs(&self, query: &SongQuery, filters: &FilterSpec) -> SongStoreResult<SongPage>;

    /// Write group, title, release date and text of `song` if its stored
    /// version still equals `song.version`. Returns the new version.
    fn update_song(&self, song: &Song) -> SongStoreResult<i32>;

    /// Delete a song by id.
    fn delete_song(&self, id: i64) -> SongStoreResult<()>;

    /// Get one page of verses of a song's lyrics.
    fn get_lyrics(&self, id: i64, page: &LyricsPage) -> SongStoreResult<Vec<String>>;

    /// Number of stored songs.
    fn count_songs(&self) -> SongStoreResult<usize>;
}

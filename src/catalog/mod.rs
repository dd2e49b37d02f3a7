//! Caller-facing song catalog operations.
//!
//! `SongCatalog` validates input, enriches new songs through the detail
//! lookup and delegates persistence to a [`SongStore`].

mod error;

pub use error::{CatalogError, CatalogResult};

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::server::metrics;
use crate::song_details::SongDetailProvider;
use crate::song_store::{
    validate_song, FilterRules, FilterSpec, LyricsPage, NewSong, Song, SongPage, SongQuery,
    SongStore, Validator,
};

pub struct SongCatalog {
    store: Arc<dyn SongStore>,
    details: Arc<dyn SongDetailProvider>,
    rules: FilterRules,
}

impl SongCatalog {
    pub fn new(
        store: Arc<dyn SongStore>,
        details: Arc<dyn SongDetailProvider>,
        rules: FilterRules,
    ) -> Self {
        Self {
            store,
            details,
            rules,
        }
    }

    /// Rules the HTTP layer parses listing parameters with.
    pub fn filter_rules(&self) -> &FilterRules {
        &self.rules
    }

    pub fn list_songs(&self, query: &SongQuery, filters: &FilterSpec) -> CatalogResult<SongPage> {
        Ok(self.store.list_songs(query, filters)?)
    }

    /// Creates a song from its group and title, filling release date,
    /// lyrics and link from the detail lookup. Nothing is written when the
    /// lookup fails.
    pub async fn create_song(&self, group: &str, title: &str) -> CatalogResult<Song> {
        let mut v = Validator::new();
        validate_song(&mut v, title, group);
        v.finish()?;

        let detail = self
            .details
            .fetch_details(group, title)
            .await
            .map_err(|err| {
                warn!("Song detail lookup for {} - {} failed: {}", group, title, err);
                metrics::record_lookup_failure();
                err
            })?;

        self.add_song(NewSong {
            group: group.to_string(),
            title: title.to_string(),
            release_date: detail.release_date,
            text: detail.text,
            link: detail.link,
        })
    }

    /// Inserts a song whose details the caller already has.
    pub fn add_song(&self, song: NewSong) -> CatalogResult<Song> {
        let mut v = Validator::new();
        validate_song(&mut v, &song.title, &song.group);
        v.finish()?;

        let song = self.store.insert_song(&song)?;
        metrics::record_song_created();
        info!("Created song {} ({} - {})", song.id, song.group, song.title);
        Ok(song)
    }

    pub fn get_song(&self, id: i64) -> CatalogResult<Song> {
        Ok(self.store.get_song(id)?)
    }

    /// Writes the caller-editable fields of `song`, provided `song.version`
    /// is still the stored version. On success `song.version` holds the new
    /// version.
    pub fn update_song(&self, song: &mut Song) -> CatalogResult<()> {
        let mut v = Validator::new();
        validate_song(&mut v, &song.title, &song.group);
        v.finish()?;

        let (id, observed) = (song.id, song.version);
        song.version = self.store.update_song(song).map_err(|err| {
            debug!("Update of song {} at version {} failed: {}", id, observed, err);
            err
        })?;
        info!("Updated song {} to version {}", song.id, song.version);
        Ok(())
    }

    pub fn delete_song(&self, id: i64) -> CatalogResult<()> {
        self.store.delete_song(id)?;
        metrics::record_song_deleted();
        info!("Deleted song {}", id);
        Ok(())
    }

    pub fn get_lyrics(&self, id: i64, page: &LyricsPage) -> CatalogResult<Vec<String>> {
        Ok(self.store.get_lyrics(id, page)?)
    }

    pub fn count_songs(&self) -> CatalogResult<usize> {
        Ok(self.store.count_songs()?)
    }
}

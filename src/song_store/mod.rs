mod error;
mod filters;
mod lyrics;
mod metadata;
mod models;
mod schema;
mod store;
mod trait_def;
mod validation;

pub use error::{SongStoreError, SongStoreResult};
pub use filters::{
    FilterRules, FilterSpec, SortColumn, SortDirection, MAX_PAGE, MAX_PAGE_SIZE, SORT_SAFELIST,
};
pub use lyrics::{paginate_verses, LyricsPage, VERSE_DELIMITER};
pub use metadata::Metadata;
pub use models::{NewSong, Song, SongPage, SongQuery};
pub use schema::SONG_SCHEMA;
pub use store::{SqliteSongStore, StoreOptions, DEFAULT_QUERY_TIMEOUT, DEFAULT_READ_POOL_SIZE};
pub use trait_def::SongStore;
pub use validation::{
    validate_song, ValidationError, ValidationErrors, Validator, SONG_GROUP_MAX_BYTES,
    SONG_TITLE_MAX_BYTES,
};

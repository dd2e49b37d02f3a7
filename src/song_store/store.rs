//! SQLite-backed song store.
//!
//! One write connection plus a round-robin pool of read-only connections,
//! all on the same WAL-mode database file. Every call runs under a single
//! deadline covering the wait for a connection and the statement itself.

use super::error::{SongStoreError, SongStoreResult};
use super::filters::FilterSpec;
use super::lyrics::{paginate_verses, LyricsPage};
use super::metadata::Metadata;
use super::models::{NewSong, Song, SongPage, SongQuery};
use super::schema::SONG_SCHEMA;
use super::trait_def::SongStore;
use crate::server::metrics;
use crate::sqlite_persistence::ensure_schema;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

/// Number of SQLite VM instructions between two deadline checks.
const PROGRESS_CHECK_OPS: i32 = 1000;

const SONG_COLUMNS: &str = "id, created_at, group_name, title, release_date, text, link, version";

#[derive(Clone, Debug)]
pub struct StoreOptions {
    pub read_pool_size: usize,
    pub query_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            read_pool_size: DEFAULT_READ_POOL_SIZE,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

/// Interrupts whatever runs on `conn` once `deadline` has passed. The
/// handler is removed when the guard is dropped.
struct QueryDeadline<'c> {
    conn: &'c Connection,
}

impl<'c> QueryDeadline<'c> {
    fn arm(conn: &'c Connection, deadline: Instant) -> Self {
        conn.progress_handler(PROGRESS_CHECK_OPS, Some(move || Instant::now() >= deadline));
        Self { conn }
    }
}

impl Drop for QueryDeadline<'_> {
    fn drop(&mut self) {
        self.conn
            .progress_handler(PROGRESS_CHECK_OPS, None::<fn() -> bool>);
    }
}

#[derive(Clone)]
pub struct SqliteSongStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
    query_timeout: Duration,
}

impl SqliteSongStore {
    /// Open (creating if needed) the song database at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P, options: StoreOptions) -> Result<Self> {
        let db_path = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open song database {:?}", db_path))?;
        write_conn.busy_timeout(options.query_timeout)?;

        ensure_schema(&mut write_conn, &SONG_SCHEMA, "song")?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let song_count: i64 =
            write_conn.query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))?;
        info!("Opened song catalog {:?}: {} songs", db_path, song_count);

        let mut read_pool = Vec::with_capacity(options.read_pool_size);
        for _ in 0..options.read_pool_size.max(1) {
            let read_conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.busy_timeout(options.query_timeout)?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteSongStore {
            read_pool,
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_index: Arc::new(AtomicUsize::new(0)),
            query_timeout: options.query_timeout,
        })
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn map_sqlite_error(&self, err: rusqlite::Error) -> SongStoreError {
        match err {
            rusqlite::Error::QueryReturnedNoRows => SongStoreError::NotFound,
            err => SongStoreError::from_sqlite(err, self.query_timeout),
        }
    }

    /// Runs `f` on `conn` and records its duration. Waiting for the
    /// connection, SQLite lock waits and the statement all share one
    /// `query_timeout` budget.
    fn run<T>(
        &self,
        conn: &Mutex<Connection>,
        operation: &'static str,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> SongStoreResult<T> {
        let start = Instant::now();
        let deadline = start + self.query_timeout;

        let result = match conn.try_lock_for(self.query_timeout) {
            Some(conn) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                conn.busy_timeout(remaining)
                    .and_then(|()| {
                        let _deadline = QueryDeadline::arm(&conn, deadline);
                        f(&conn)
                    })
                    .map_err(|err| self.map_sqlite_error(err))
            }
            None => {
                debug!("No {} connection free within {:?}", operation, self.query_timeout);
                Err(SongStoreError::Timeout(self.query_timeout))
            }
        };
        metrics::record_db_query(operation, start.elapsed());

        result.map_err(|err| {
            if !matches!(err, SongStoreError::NotFound) {
                metrics::record_store_error(operation, err.kind());
            }
            err
        })
    }

    fn read<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> SongStoreResult<T> {
        let conn = self.get_read_conn();
        self.run(&conn, operation, f)
    }

    fn write<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> SongStoreResult<T> {
        self.run(&self.write_conn, operation, f)
    }
}

fn row_to_song(row: &Row) -> rusqlite::Result<Song> {
    let created_at: i64 = row.get(1)?;
    Ok(Song {
        id: row.get(0)?,
        created_at: DateTime::<Utc>::from_timestamp(created_at, 0).unwrap_or_default(),
        group: row.get(2)?,
        title: row.get(3)?,
        release_date: row.get(4)?,
        text: row.get(5)?,
        link: row.get(6)?,
        version: row.get(7)?,
    })
}

/// Shared by the page query and the past-the-end count so both always
/// agree on what matches.
const SONG_FILTER: &str = "(?1 = '' OR instr(lower(title), lower(?1)) > 0) \
     AND (?2 = '' OR group_name = ?2)";

impl SongStore for SqliteSongStore {
    fn insert_song(&self, song: &NewSong) -> SongStoreResult<Song> {
        let inserted = self.write("insert_song", |conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO songs (group_name, title, release_date, text, link) \
                     VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {SONG_COLUMNS}"
                ),
                params![
                    song.group,
                    song.title,
                    song.release_date,
                    song.text,
                    song.link
                ],
                row_to_song,
            )
        })?;
        debug!("Inserted song {} ({} - {})", inserted.id, inserted.group, inserted.title);
        Ok(inserted)
    }

    fn get_song(&self, id: i64) -> SongStoreResult<Song> {
        if id < 1 {
            return Err(SongStoreError::NotFound);
        }
        self.read("get_song", |conn| {
            conn.query_row(
                &format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ?1"),
                params![id],
                row_to_song,
            )
        })
    }

    fn list_songs(&self, query: &SongQuery, filters: &FilterSpec) -> SongStoreResult<SongPage> {
        let sql = format!(
            "SELECT {SONG_COLUMNS}, count(*) OVER() FROM songs \
             WHERE {SONG_FILTER} \
             ORDER BY {} {}, id ASC \
             LIMIT ?3 OFFSET ?4",
            filters.sort_column().as_sql(),
            filters.sort_direction().as_sql(),
        );
        let limit = filters.limit() as i64;
        let offset = filters.offset() as i64;

        let (songs, total) = self.read("list_songs", |conn| {
            let tx = conn.unchecked_transaction()?;
            let mut total: u64 = 0;
            let mut songs = Vec::new();
            {
                let mut stmt = tx.prepare_cached(&sql)?;
                let mut rows = stmt.query(params![query.name, query.group, limit, offset])?;
                while let Some(row) = rows.next()? {
                    total = row.get::<_, i64>(8)? as u64;
                    songs.push(row_to_song(row)?);
                }
            }
            if songs.is_empty() && offset > 0 {
                total = tx.query_row(
                    &format!("SELECT count(*) FROM songs WHERE {SONG_FILTER}"),
                    params![query.name, query.group],
                    |r| r.get::<_, i64>(0),
                )? as u64;
            }
            tx.finish()?;
            Ok((songs, total))
        })?;

        Ok(SongPage {
            songs,
            metadata: Metadata::compute(total, filters.page(), filters.page_size()),
        })
    }

    fn update_song(&self, song: &Song) -> SongStoreResult<i32> {
        if song.id < 1 {
            return Err(SongStoreError::NotFound);
        }
        let new_version = self.write("update_song", |conn| {
            conn.query_row(
                "UPDATE songs SET group_name = ?1, title = ?2, release_date = ?3, text = ?4, \
                 version = version + 1 \
                 WHERE id = ?5 AND version = ?6 \
                 RETURNING version",
                params![
                    song.group,
                    song.title,
                    song.release_date,
                    song.text,
                    song.id,
                    song.version
                ],
                |r| r.get::<_, i32>(0),
            )
            .optional()
        })?;

        match new_version {
            Some(version) => Ok(version),
            None => {
                metrics::record_edit_conflict();
                Err(SongStoreError::EditConflict)
            }
        }
    }

    fn delete_song(&self, id: i64) -> SongStoreResult<()> {
        if id < 1 {
            return Err(SongStoreError::NotFound);
        }
        let deleted = self.write("delete_song", |conn| {
            conn.execute("DELETE FROM songs WHERE id = ?1", params![id])
        })?;
        if deleted == 0 {
            return Err(SongStoreError::NotFound);
        }
        Ok(())
    }

    fn get_lyrics(&self, id: i64, page: &LyricsPage) -> SongStoreResult<Vec<String>> {
        if id < 1 {
            return Err(SongStoreError::NotFound);
        }
        let text: String = self.read("get_lyrics", |conn| {
            conn.query_row("SELECT text FROM songs WHERE id = ?1", params![id], |r| {
                r.get(0)
            })
        })?;
        Ok(paginate_verses(&text, page)
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    fn count_songs(&self) -> SongStoreResult<usize> {
        let count: i64 = self.read("count_songs", |conn| {
            conn.query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))
        })?;
        Ok(count as usize)
    }
}

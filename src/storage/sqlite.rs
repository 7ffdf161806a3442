use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;

use super::{Result, SongFilter, SongStore, StorageError};
use crate::song::Song;

type SongRow = (i64, String, String, String, String, String);

type NameRow = (i64, String, String);

const SELECT_SONGS: &str =
    "SELECT id, song, group_name, release_date, text, link FROM songs WHERE 1 = 1";

const SELECT_NAMES: &str = "SELECT id, song, group_name FROM songs WHERE 1 = 1";

/// Stays below SQLite's bound parameter limit
const LOAD_CHUNK: usize = 500;

#[derive(Debug, Clone)]
pub struct SqliteSongStore {
    pool: SqlitePool,
}

impl SqliteSongStore {
    /// Open a connection pool, e.g. `sqlite:songs.db`.
    /// The database file is created if missing.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        tracing::debug!("Connected to song database: {}", database_url);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `songs` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS songs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                song TEXT NOT NULL,
                group_name TEXT NOT NULL,
                release_date TEXT NOT NULL DEFAULT '',
                text TEXT NOT NULL DEFAULT '',
                link TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Song database schema ready");
        Ok(())
    }
}

fn song_from_row((id, song, group, release_date, text, link): SongRow) -> Song {
    Song {
        id: id as u64,
        song,
        group,
        release_date,
        text,
        link,
    }
}

/// Ids beyond `i64::MAX` can never be stored
fn row_id(id: u64) -> Result<i64> {
    i64::try_from(id).map_err(|_| StorageError::NotFound)
}

fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn push_exact_terms(query: &mut QueryBuilder<'_, Sqlite>, filter: &SongFilter) -> Result<()> {
    if filter.id != 0 {
        query.push(" AND id = ").push_bind(row_id(filter.id)?);
    }
    if !filter.release_date.is_empty() {
        query
            .push(" AND release_date = ")
            .push_bind(filter.release_date.clone());
    }
    Ok(())
}

impl SqliteSongStore {
    /// Ids of the requested page of songs matching `filter`.
    ///
    /// SQLite's lower() only folds ASCII, so substring terms are matched here
    /// over the name columns only.
    async fn matching_ids(&self, filter: &SongFilter, offset: u64, limit: u64) -> Result<Vec<i64>> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_NAMES);
        push_exact_terms(&mut query, filter)?;
        query.push(" ORDER BY id");

        let mut rows = query.build_query_as::<NameRow>().fetch(&self.pool);
        let mut skipped = 0;
        let mut ids = Vec::new();
        while let Some((id, song, group)) = rows.try_next().await? {
            if !filter.matches_names(&song, &group) {
                continue;
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }
            ids.push(id);
            if limit != 0 && ids.len() as u64 >= limit {
                break;
            }
        }
        Ok(ids)
    }

    /// Full rows for ascending `ids`, in id order
    async fn load_songs(&self, ids: &[i64]) -> Result<Vec<Song>> {
        let mut songs = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(LOAD_CHUNK) {
            let mut query = QueryBuilder::<Sqlite>::new(SELECT_SONGS);
            query.push(" AND id IN (");
            let mut separated = query.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(") ORDER BY id");

            let rows = query.build_query_as::<SongRow>().fetch_all(&self.pool).await?;
            songs.extend(rows.into_iter().map(song_from_row));
        }
        Ok(songs)
    }
}

#[async_trait]
impl SongStore for SqliteSongStore {
    async fn create(&self, song: &Song) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO songs (song, group_name, release_date, text, link)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&song.song)
        .bind(&song.group)
        .bind(&song.release_date)
        .bind(&song.text)
        .bind(&song.link)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid() as u64)
    }

    async fn list(&self, filter: &SongFilter, offset: u64, limit: u64) -> Result<Vec<Song>> {
        let songs = if filter.has_text_terms() {
            let ids = self.matching_ids(filter, offset, limit).await?;
            self.load_songs(&ids).await?
        } else {
            let mut query = QueryBuilder::<Sqlite>::new(SELECT_SONGS);
            push_exact_terms(&mut query, filter)?;
            // LIMIT -1 means no limit
            let limit = if limit == 0 { -1 } else { clamp(limit) };
            query
                .push(" ORDER BY id LIMIT ")
                .push_bind(limit)
                .push(" OFFSET ")
                .push_bind(clamp(offset));

            query
                .build_query_as::<SongRow>()
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(song_from_row)
                .collect()
        };

        if songs.is_empty() {
            return Err(StorageError::NotFound);
        }
        Ok(songs)
    }

    async fn lyrics_text(&self, id: u64) -> Result<String> {
        let row = sqlx::query_as::<_, (String,)>("SELECT text FROM songs WHERE id = ?")
            .bind(row_id(id)?)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(text,)| text).ok_or(StorageError::NotFound)
    }

    async fn remove(&self, id: u64) -> Result<()> {
        let result = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(row_id(id)?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn update(&self, song: &Song) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE songs
            SET song = ?, group_name = ?, release_date = ?, text = ?, link = ?
            WHERE id = ?
            "#,
        )
        .bind(&song.song)
        .bind(&song.group)
        .bind(&song.release_date)
        .bind(&song.text)
        .bind(&song.link)
        .bind(row_id(song.id)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

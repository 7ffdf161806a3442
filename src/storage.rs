//! Song persistence
//!
//! Handlers only see the [`SongStore`] trait; [`sqlite::SqliteSongStore`] is the
//! production backend.

pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::song::Song;

pub use sqlite::SqliteSongStore;

#[derive(Error, Debug)]
pub enum StorageError {
    /// No song matched the requested id or filter
    #[error("Song not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// A partially-populated song used as a list predicate.
///
/// Zero-valued fields are wildcards. `id` and `release_date` must match exactly,
/// `song` and `group` match as case-insensitive substrings. `text` and `link`
/// are ignored.
pub type SongFilter = Song;

impl SongFilter {
    /// Check whether `song` satisfies this filter
    pub fn matches(&self, song: &Song) -> bool {
        (self.id == 0 || self.id == song.id)
            && self.matches_names(&song.song, &song.group)
            && (self.release_date.is_empty() || self.release_date == song.release_date)
    }

    /// Check only the substring terms, against a song title and group name
    pub fn matches_names(&self, song: &str, group: &str) -> bool {
        contains_ignore_case(song, &self.song) && contains_ignore_case(group, &self.group)
    }

    /// Whether the filter needs substring matching on text columns
    pub fn has_text_terms(&self) -> bool {
        !self.song.is_empty() || !self.group.is_empty()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Storage backend for the catalog
///
/// Implementations must be safe to call concurrently from many requests.
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Persist a new song and return its assigned, non-zero id.
    /// The `id` of the argument is ignored.
    async fn create(&self, song: &Song) -> Result<u64>;

    /// List songs matching `filter`, ordered by id.
    ///
    /// Skips `offset` matches and returns at most `limit` songs (`0` = no limit).
    /// Backends may report an empty result either as `Ok(vec![])` or as
    /// [`StorageError::NotFound`].
    async fn list(&self, filter: &SongFilter, offset: u64, limit: u64) -> Result<Vec<Song>>;

    /// Get the full lyrics of a song
    async fn lyrics_text(&self, id: u64) -> Result<String>;

    /// Delete a song. [`StorageError::NotFound`] if nothing was deleted.
    async fn remove(&self, id: u64) -> Result<()>;

    /// Overwrite every field of the song with `song.id`.
    /// [`StorageError::NotFound`] if no row was affected.
    async fn update(&self, song: &Song) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: u64, title: &str, group: &str, release_date: &str) -> Song {
        Song {
            id,
            song: title.to_string(),
            group: group.to_string(),
            release_date: release_date.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = SongFilter::default();
        assert!(filter.matches(&song(1, "Uprising", "Muse", "")));
        assert!(filter.matches(&Song::default()));
        assert!(!filter.has_text_terms());
    }

    #[test]
    fn test_text_fields_are_case_insensitive_substrings() {
        let filter = SongFilter {
            song: "some song".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&song(1, "Some Song Remix", "DJ", "")));
        assert!(!filter.matches(&song(2, "Other", "DJ", "")));

        let filter = SongFilter {
            group: "ÄRZTE".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&song(3, "Schrei nach Liebe", "Die Ärzte", "")));
    }

    #[test]
    fn test_id_and_date_are_exact() {
        let filter = SongFilter {
            id: 2,
            ..Default::default()
        };
        assert!(filter.matches(&song(2, "A", "B", "")));
        assert!(!filter.matches(&song(12, "A", "B", "")));

        let filter = SongFilter {
            release_date: "2006".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&song(1, "A", "B", "2006")));
        assert!(!filter.matches(&song(1, "A", "B", "16.07.2006")));
    }

    #[test]
    fn test_text_and_link_are_ignored() {
        let filter = SongFilter {
            text: "nothing like this".to_string(),
            link: "https://nowhere".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&song(1, "A", "B", "")));
    }

    #[test]
    fn test_all_terms_must_match() {
        let filter = SongFilter {
            song: "star".to_string(),
            group: "muse".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&song(1, "Starlight", "Muse", "")));
        assert!(!filter.matches(&song(2, "Starlight", "Queen", "")));
        assert!(filter.has_text_terms());
    }
}

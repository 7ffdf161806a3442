use serde::{Deserialize, Deserializer, Serialize};

/// A catalog entry.
///
/// Every field defaults to its zero value when absent from a JSON payload, so
/// the same type serves as a full record, an update payload and a list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Song {
    /// Storage-assigned identifier. `0` means "unassigned".
    #[serde(skip_serializing_if = "is_zero")]
    pub id: u64,
    pub song: String,
    pub group: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub release_date: String,
    /// Full lyrics, couplets separated by a blank line
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
}

impl Song {
    pub fn new(song: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            song: song.into(),
            group: group.into(),
            ..Default::default()
        }
    }

    /// Fill the enrichment fields from provider data
    pub fn with_extra(mut self, extra: SongExtra) -> Self {
        self.release_date = extra.release_date;
        self.text = extra.text;
        self.link = extra.link;
        self
    }
}

fn is_zero(id: &u64) -> bool {
    *id == 0
}

/// Enrichment data returned by a metadata provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongExtra {
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// `{"id": n}` envelope: delete request and create response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdMessage {
    pub id: u64,
}

/// Body of a create request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SongCreate {
    pub song: String,
    pub group: String,
}

/// Body of a list request. An empty body is equivalent to `ListRequest::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub offset: u64,
    /// Maximum number of songs to return, `0` for no limit
    #[serde(deserialize_with = "null_as_default")]
    pub limit: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub filter: Song,
}

/// Read a JSON `null` as the zero value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a lyrics request (the POST variant of `/lyrics`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsRequest {
    #[serde(default)]
    pub song_id: u64,
    #[serde(default)]
    pub couplet_num: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_omits_empty_fields() {
        let song = Song::new("Supermassive Black Hole", "Muse");
        let json = serde_json::to_value(&song).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"song": "Supermassive Black Hole", "group": "Muse"})
        );
    }

    #[test]
    fn test_song_missing_fields_default() {
        let song: Song = serde_json::from_str(r#"{"id": 7, "song": "Hysteria"}"#).unwrap();
        assert_eq!(song.id, 7);
        assert_eq!(song.song, "Hysteria");
        assert!(song.group.is_empty());
        assert!(song.release_date.is_empty());
    }

    #[test]
    fn test_list_request_nested_filter() {
        let request: ListRequest =
            serde_json::from_str(r#"{"limit": 5, "filter": {"group": "muse"}}"#).unwrap();
        assert_eq!(request.offset, 0);
        assert_eq!(request.limit, 5);
        assert_eq!(request.filter.group, "muse");
    }

    #[test]
    fn test_list_request_null_fields_default() {
        let request: ListRequest =
            serde_json::from_str(r#"{"offset": null, "limit": 3, "filter": null}"#).unwrap();
        assert_eq!(request.offset, 0);
        assert_eq!(request.limit, 3);
        assert_eq!(request.filter, Song::default());
    }

    #[test]
    fn test_list_request_rejects_negative_offset() {
        assert!(serde_json::from_str::<ListRequest>(r#"{"offset": -1}"#).is_err());
    }

    #[test]
    fn test_with_extra() {
        let song = Song::new("Starlight", "Muse").with_extra(SongExtra {
            release_date: "16.07.2006".to_string(),
            text: "Far away\n\nThis ship".to_string(),
            link: "https://example.com/starlight".to_string(),
        });
        assert_eq!(song.release_date, "16.07.2006");
        assert_eq!(song.link, "https://example.com/starlight");
        assert_eq!(song.id, 0);
    }
}

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::lyrics;
use crate::metadata::MetadataProvider;
use crate::song::{IdMessage, ListRequest, LyricsRequest, Song, SongCreate};
use crate::storage::{SongStore, StorageError};

/// Request bodies are read fully into memory, up to this size
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SongStore>,
    pub metadata: Arc<dyn MetadataProvider>,
}

pub fn create_router(store: Arc<dyn SongStore>, metadata: Arc<dyn MetadataProvider>) -> Router {
    let state = AppState { store, metadata };

    Router::new()
        .route(
            "/song",
            post(create_song).put(update_song).delete(delete_song),
        )
        .route("/songs", get(list_songs).post(list_songs))
        .route("/lyrics", get(get_lyrics).post(post_lyrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Read the whole request body. A failed read is a server-side fault.
async fn read_body(body: Body) -> Result<Bytes, StatusCode> {
    axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read request body: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StatusCode> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::debug!("Failed to parse request body: {}", e);
        StatusCode::BAD_REQUEST
    })
}

fn internal_error(action: &str, e: StorageError) -> StatusCode {
    tracing::error!("Failed to {}: {}", action, e);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Create a song, enriched with extra data when the provider has it
async fn create_song(
    State(state): State<AppState>,
    body: Body,
) -> Result<(StatusCode, Json<IdMessage>), StatusCode> {
    let body = read_body(body).await?;
    let create: SongCreate = parse_json(&body)?;

    // blank names are rejected, but stored names are kept as sent
    if create.song.trim().is_empty() {
        tracing::debug!("Song name is empty");
        return Err(StatusCode::BAD_REQUEST);
    }
    if create.group.trim().is_empty() {
        tracing::debug!("Song group is empty");
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut song = Song::new(create.song, create.group);
    match state.metadata.fetch_extra(&song.song, &song.group).await {
        Ok(extra) => song = song.with_extra(extra),
        Err(e) => {
            tracing::warn!(
                "Failed to get extra data for '{}' by '{}', saving without it: {}",
                song.song,
                song.group,
                e
            );
        }
    }

    let id = state
        .store
        .create(&song)
        .await
        .map_err(|e| internal_error("create song", e))?;

    tracing::debug!("Created song {}: '{}' by '{}'", id, song.song, song.group);
    Ok((StatusCode::CREATED, Json(IdMessage { id })))
}

/// Replace every field of an existing song
async fn update_song(State(state): State<AppState>, body: Body) -> Result<StatusCode, StatusCode> {
    let body = read_body(body).await?;
    let song: Song = parse_json(&body)?;
    if song.id == 0 {
        tracing::debug!("Song id is empty");
        return Err(StatusCode::BAD_REQUEST);
    }

    state.store.update(&song).await.map_err(|e| match e {
        StorageError::NotFound => {
            tracing::debug!("Song {} not found", song.id);
            StatusCode::NOT_FOUND
        }
        e => internal_error("update song", e),
    })?;

    tracing::debug!("Updated song {}", song.id);
    Ok(StatusCode::OK)
}

/// Delete a song. Deleting a missing song answers 204, not an error.
async fn delete_song(State(state): State<AppState>, body: Body) -> Result<StatusCode, StatusCode> {
    let body = read_body(body).await?;
    let IdMessage { id }: IdMessage = parse_json(&body)?;
    if id == 0 {
        tracing::debug!("Song id is empty");
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.store.remove(id).await {
        Ok(()) => {
            tracing::debug!("Deleted song {}", id);
            Ok(StatusCode::OK)
        }
        Err(StorageError::NotFound) => {
            tracing::debug!("Song {} not found, nothing to delete", id);
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => Err(internal_error("delete song", e)),
    }
}

/// List songs with optional filter and pagination
async fn list_songs(State(state): State<AppState>, body: Body) -> Result<Response, StatusCode> {
    let body = read_body(body).await?;
    // an empty body and a JSON `null` both mean "everything"
    let request: ListRequest = if body.is_empty() {
        ListRequest::default()
    } else {
        parse_json::<Option<ListRequest>>(&body)?.unwrap_or_default()
    };

    match state
        .store
        .list(&request.filter, request.offset, request.limit)
        .await
    {
        Ok(songs) => {
            tracing::debug!("Returning {} songs", songs.len());
            Ok(Json(songs).into_response())
        }
        Err(StorageError::NotFound) => {
            tracing::debug!("No songs match {:?}", request);
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(e) => Err(internal_error("list songs", e)),
    }
}

#[derive(Debug, Deserialize)]
struct LyricsParams {
    song_id: Option<String>,
    couplet_num: Option<String>,
}

fn parse_param<T>(name: &str, value: Option<&str>) -> Result<T, StatusCode>
where
    T: FromStr,
    T::Err: Display,
{
    let value = value.ok_or_else(|| {
        tracing::debug!("Missing query parameter {}", name);
        StatusCode::BAD_REQUEST
    })?;
    value.parse().map_err(|e| {
        tracing::debug!("Invalid {} '{}': {}", name, value, e);
        StatusCode::BAD_REQUEST
    })
}

/// Get one couplet, `GET /lyrics?song_id=..&couplet_num=..`
async fn get_lyrics(
    State(state): State<AppState>,
    Query(params): Query<LyricsParams>,
) -> Result<Response, StatusCode> {
    let song_id = parse_param("song_id", params.song_id.as_deref())?;
    let couplet_num = parse_param("couplet_num", params.couplet_num.as_deref())?;
    lookup_couplet(state.store.as_ref(), song_id, couplet_num).await
}

/// Get one couplet, `POST /lyrics` with `{"song_id": .., "couplet_num": ..}`
async fn post_lyrics(State(state): State<AppState>, body: Body) -> Result<Response, StatusCode> {
    let body = read_body(body).await?;
    let request: LyricsRequest = parse_json(&body)?;
    lookup_couplet(state.store.as_ref(), request.song_id, request.couplet_num).await
}

async fn lookup_couplet(
    store: &dyn SongStore,
    song_id: u64,
    couplet_num: usize,
) -> Result<Response, StatusCode> {
    if song_id == 0 {
        tracing::debug!("Song id is empty");
        return Err(StatusCode::BAD_REQUEST);
    }

    let text = store.lyrics_text(song_id).await.map_err(|e| match e {
        StorageError::NotFound => {
            tracing::debug!("No song found with id {}", song_id);
            StatusCode::NOT_FOUND
        }
        e => internal_error("get song lyrics", e),
    })?;

    match lyrics::couplet(&text, couplet_num) {
        Some(couplet) => Ok(couplet.to_string().into_response()),
        None => {
            tracing::debug!(
                "Requested couplet {}, but song {} has only {} couplets",
                couplet_num,
                song_id,
                lyrics::couplets(&text).len()
            );
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

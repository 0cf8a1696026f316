//! Song catalog endpoints
//!
//! - `GET /songs` filtered, paginated listing
//! - `GET /songs/:id` fetch, optionally a single verse (`?verse=n`)
//! - `POST /songs` create with enrichment
//! - `PUT /songs/:id` full overwrite
//! - `DELETE /songs/:id`

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use songlib_common::db::{parse_release_date, Song, SongFilter, SongSummary, SongUpdate};
use songlib_common::pagination::PageRequest;
use songlib_common::verse::select_verse;
use tracing::debug;

use crate::{ApiError, ApiResult, AppState};

/// Query parameters for `GET /songs`
///
/// Kept as raw strings: empty filters mean "no filter" and bad paging
/// values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListSongsQuery {
    pub group_name: Option<String>,
    pub song_title: Option<String>,
    /// YYYY-MM-DD
    pub release_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Query parameters for `GET /songs/:id`
#[derive(Debug, Default, Deserialize)]
pub struct GetSongQuery {
    /// 1-based verse number; absent or empty returns the full text
    pub verse: Option<String>,
}

/// Body of `POST /songs`
#[derive(Debug, Deserialize)]
pub struct AddSongRequest {
    pub group: String,
    pub song: String,
}

/// Body of `PUT /songs/:id`
#[derive(Debug, Deserialize)]
pub struct UpdateSongRequest {
    pub group_name: String,
    pub song_title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl UpdateSongRequest {
    fn into_update(self) -> ApiResult<SongUpdate> {
        require_non_empty("group_name", &self.group_name)?;
        require_non_empty("song_title", &self.song_title)?;

        let release_date = match self.release_date.filter(|d| !d.is_empty()) {
            Some(raw) => Some(parse_release_date(&raw)?),
            None => None,
        };

        Ok(SongUpdate {
            group_name: self.group_name,
            song_title: self.song_title,
            release_date,
            text: self.text.filter(|t| !t.is_empty()),
            link: self.link.filter(|l| !l.is_empty()),
        })
    }
}

/// `POST /songs` response
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// `PUT` / `DELETE` response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub id: i64,
    pub status: &'static str,
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/songs", get(list_songs).post(create_song))
        .route(
            "/songs/:id",
            get(get_song).put(update_song).delete(delete_song),
        )
}

fn song_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id).map_err(|e| {
        debug!(error = %e, "Rejected song id");
        ApiError::BadRequest("Invalid song id".to_string())
    })
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))
}

fn require_non_empty(field: &str, value: &str) -> ApiResult<()> {
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn song_not_found(id: i64) -> ApiError {
    debug!(song_id = id, "Song not found");
    ApiError::NotFound(format!("Song {} not found", id))
}

/// GET /songs
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<ListSongsQuery>,
) -> ApiResult<Json<Vec<SongSummary>>> {
    let filter = SongFilter::from_params(
        query.group_name.as_deref(),
        query.song_title.as_deref(),
        query.release_date.as_deref(),
    )?;
    let page = PageRequest::from_params(query.page.as_deref(), query.limit.as_deref());

    let songs = state.store.list(&filter, page).await?;
    Ok(Json(songs))
}

/// GET /songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    Query(query): Query<GetSongQuery>,
) -> ApiResult<Json<Song>> {
    let id = song_id(id)?;

    let mut song = state
        .store
        .fetch(id)
        .await?
        .ok_or_else(|| song_not_found(id))?;

    if let Some(raw) = query.verse.as_deref().filter(|v| !v.is_empty()) {
        let index: i64 = raw
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("Invalid verse number: {}", raw)))?;

        // Absent text segments like empty text: one empty verse
        let verse = select_verse(song.text.as_deref().unwrap_or_default(), index).map_err(|e| {
            debug!(song_id = id, error = %e, "Verse unavailable");
            ApiError::from(e)
        })?;
        song.text = Some(verse.to_string());
    }

    Ok(Json(song))
}

/// POST /songs
pub async fn create_song(
    State(state): State<AppState>,
    body: Result<Json<AddSongRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let request = json_body(body)?;
    require_non_empty("group", &request.group)?;
    require_non_empty("song", &request.song)?;

    let id = state
        .coordinator
        .create(&request.group, &request.song)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /songs/:id
pub async fn update_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateSongRequest>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let id = song_id(id)?;
    let update = json_body(body)?.into_update()?;

    if !state.store.update(id, &update).await? {
        return Err(song_not_found(id));
    }

    Ok(Json(StatusResponse {
        id,
        status: "updated",
    }))
}

/// DELETE /songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let id = song_id(id)?;

    if !state.store.delete(id).await? {
        return Err(song_not_found(id));
    }

    Ok(Json(StatusResponse {
        id,
        status: "deleted",
    }))
}

//! Song endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::errors::ApiError;
use super::state::GuardedSongCatalog;
use crate::catalog::CatalogError;
use crate::song_store::{FilterSpec, LyricsPage, SongQuery};

#[derive(Deserialize, Debug, Default)]
pub struct ListSongsParams {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group: String,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateSongBody {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub song: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateSongBody {
    pub group: Option<String>,
    pub song: Option<String>,
    #[serde(rename = "releaseDate")]
    pub release_date: Option<String>,
    pub text: Option<String>,
    /// Version the caller last saw. Without it the update applies on top of
    /// whatever is stored when the request arrives.
    pub version: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct LyricsParams {
    pub page: Option<String>,
    pub size: Option<String>,
}

/// Ids are positive integers; anything else cannot name a song.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::NotFound),
    }
}

pub async fn list_songs(
    State(catalog): State<GuardedSongCatalog>,
    Query(params): Query<ListSongsParams>,
) -> Result<Response, ApiError> {
    let filters = FilterSpec::parse(
        catalog.filter_rules(),
        params.page.as_deref(),
        params.page_size.as_deref(),
        params.sort.as_deref(),
    )
    .map_err(CatalogError::from)?;

    let page = catalog.list_songs(&SongQuery::new(params.name, params.group), &filters)?;
    Ok(Json(page).into_response())
}

pub async fn create_song(
    State(catalog): State<GuardedSongCatalog>,
    body: Result<Json<CreateSongBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let song = catalog.create_song(&body.group, &body.song).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/songs/{}", song.id))],
        Json(json!({ "song": song })),
    )
        .into_response())
}

pub async fn get_song(
    State(catalog): State<GuardedSongCatalog>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let song = catalog.get_song(parse_id(&id)?)?;
    Ok(Json(json!({ "song": song })).into_response())
}

pub async fn update_song(
    State(catalog): State<GuardedSongCatalog>,
    Path(id): Path<String>,
    body: Result<Json<UpdateSongBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let Json(body) = body?;

    let mut song = catalog.get_song(id)?;
    if let Some(group) = body.group {
        song.group = group;
    }
    if let Some(title) = body.song {
        song.title = title;
    }
    if let Some(release_date) = body.release_date {
        song.release_date = release_date;
    }
    if let Some(text) = body.text {
        song.text = text;
    }
    if let Some(version) = body.version {
        song.version = version;
    }

    catalog.update_song(&mut song)?;
    Ok(Json(json!({ "song": song })).into_response())
}

pub async fn delete_song(
    State(catalog): State<GuardedSongCatalog>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    catalog.delete_song(parse_id(&id)?)?;
    Ok(Json(json!({ "message": "song successfully deleted" })).into_response())
}

pub async fn get_lyrics(
    State(catalog): State<GuardedSongCatalog>,
    Path(id): Path<String>,
    Query(params): Query<LyricsParams>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let page = LyricsPage::parse(params.page.as_deref(), params.size.as_deref())
        .map_err(CatalogError::from)?;

    let lyrics = catalog.get_lyrics(id, &page)?;
    Ok(Json(json!({ "lyrics": lyrics })).into_response())
}

pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

//! Catalog management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use soundsync_core::TrackId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Track, TrackInput};
use crate::services::CatalogService;
use crate::state::AppState;

/// Every track, including hidden ones.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Track>>> {
    Ok(Json(CatalogService::new(state.storage()).list()?))
}

/// One track.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<u32>,
) -> Result<Json<Track>> {
    CatalogService::new(state.storage())
        .get(TrackId::new(id))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("track {id}")))
}

/// Add a track.
#[instrument(skip(state, admin, input), fields(admin = %admin.email))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<TrackInput>,
) -> Result<(StatusCode, Json<Track>)> {
    let track = CatalogService::new(state.storage()).create(input)?;
    Ok((StatusCode::CREATED, Json(track)))
}

/// Replace a track's fields.
#[instrument(skip(state, admin, input), fields(admin = %admin.email))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<u32>,
    Json(input): Json<TrackInput>,
) -> Result<Json<Track>> {
    Ok(Json(
        CatalogService::new(state.storage()).update(TrackId::new(id), input)?,
    ))
}

/// Delete a track.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<u32>,
) -> Result<StatusCode> {
    CatalogService::new(state.storage()).delete(TrackId::new(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flip whether a track is featured on the home page.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn toggle_featured(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<u32>,
) -> Result<Json<Track>> {
    Ok(Json(
        CatalogService::new(state.storage()).toggle_featured(TrackId::new(id))?,
    ))
}

/// Flip whether a track is in stock.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn toggle_in_stock(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<u32>,
) -> Result<Json<Track>> {
    Ok(Json(
        CatalogService::new(state.storage()).toggle_in_stock(TrackId::new(id))?,
    ))
}

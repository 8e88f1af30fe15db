//! Carousel management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use soundsync_core::CarouselItemId;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{CarouselInput, CarouselItem};
use crate::services::CarouselService;
use crate::state::AppState;

/// Every slide in display order, active or not.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<CarouselItem>>> {
    Ok(Json(CarouselService::new(state.storage()).list()?))
}

/// Add a slide.
#[instrument(skip(state, _admin, input))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CarouselInput>,
) -> Result<(StatusCode, Json<CarouselItem>)> {
    let item = CarouselService::new(state.storage()).create(input)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Replace a slide.
#[instrument(skip(state, _admin, input))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<u32>,
    Json(input): Json<CarouselInput>,
) -> Result<Json<CarouselItem>> {
    Ok(Json(
        CarouselService::new(state.storage()).update(CarouselItemId::new(id), input)?,
    ))
}

/// Delete a slide.
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<u32>,
) -> Result<StatusCode> {
    CarouselService::new(state.storage()).delete(CarouselItemId::new(id))?;
    Ok(StatusCode::NO_CONTENT)
}

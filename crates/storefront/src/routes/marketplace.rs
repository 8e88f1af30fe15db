//! Marketplace listing.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::models::Track;
use crate::services::CatalogService;
use crate::state::AppState;

/// Marketplace query parameters.
#[derive(Debug, Deserialize)]
pub struct MarketplaceQuery {
    pub genre: Option<String>,
}

/// List in-stock tracks, optionally by genre.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<MarketplaceQuery>,
) -> Result<Json<Vec<Track>>> {
    let genre = query.genre.as_deref().filter(|genre| !genre.trim().is_empty());
    Ok(Json(CatalogService::new(state.storage()).marketplace(genre)?))
}

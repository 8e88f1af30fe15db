//! Seller moderation.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use super::parse_email;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::services::{SellerService, SellerStatus};
use crate::state::AppState;

/// Approve a seller whose onboarding is complete.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn approve(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(email): Path<String>,
) -> Result<Json<SellerStatus>> {
    let email = parse_email(&email)?;
    let status = SellerService::new(state.storage(), state.config().delays).approve(&email)?;
    Ok(Json(status))
}

/// Block a seller.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn block(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(email): Path<String>,
) -> Result<Json<SellerStatus>> {
    let email = parse_email(&email)?;
    let status = SellerService::new(state.storage(), state.config().delays).block(&email)?;
    Ok(Json(status))
}

/// Lift a block.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn unblock(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(email): Path<String>,
) -> Result<Json<SellerStatus>> {
    let email = parse_email(&email)?;
    let status = SellerService::new(state.storage(), state.config().delays).unblock(&email)?;
    Ok(Json(status))
}

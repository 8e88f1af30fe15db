//! Admin console handlers.
//!
//! Every handler requires an effective admin role from the roster; roster
//! management requires super admin.

pub mod carousel;
pub mod roster;
pub mod sellers;
pub mod tracks;

use axum::{Json, extract::State};
use soundsync_core::Email;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Purchase;
use crate::services::PurchaseService;
use crate::state::AppState;

/// Every purchase in the profile, newest first.
#[instrument(skip(state, _admin))]
pub async fn purchases(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Purchase>>> {
    Ok(Json(PurchaseService::new(state.storage()).list_all()?))
}

/// Parse an email from a path segment or request body.
pub(crate) fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

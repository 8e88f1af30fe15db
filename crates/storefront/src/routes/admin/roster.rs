//! Admin roster management (super admin only).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use soundsync_core::{Role, RosterStatus};

use super::parse_email;
use crate::error::Result;
use crate::middleware::RequireSuperAdmin;
use crate::models::RosterEntry;
use crate::services::RosterService;
use crate::state::AppState;

/// Roster upsert request.
#[derive(Debug, Deserialize)]
pub struct RosterForm {
    pub email: String,
    pub role: Role,
}

/// Roster status change request.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: RosterStatus,
}

/// Every roster entry.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
) -> Result<Json<Vec<RosterEntry>>> {
    Ok(Json(RosterService::new(state.storage()).list()?))
}

/// Grant a role, activating the entry.
#[instrument(skip(state, admin, form), fields(admin = %admin.email, email = %form.email))]
pub async fn upsert(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Json(form): Json<RosterForm>,
) -> Result<Json<RosterEntry>> {
    let email = parse_email(&form.email)?;
    Ok(Json(
        RosterService::new(state.storage()).upsert(email, form.role)?,
    ))
}

/// Activate or deactivate an entry.
#[instrument(skip(state, admin, form), fields(admin = %admin.email))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Path(email): Path<String>,
    Json(form): Json<StatusForm>,
) -> Result<Json<RosterEntry>> {
    let email = parse_email(&email)?;
    Ok(Json(
        RosterService::new(state.storage()).set_status(&email, form.status)?,
    ))
}

/// Remove an entry.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn remove(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Path(email): Path<String>,
) -> Result<StatusCode> {
    let email = parse_email(&email)?;
    RosterService::new(state.storage()).remove(&email)?;
    Ok(StatusCode::NO_CONTENT)
}

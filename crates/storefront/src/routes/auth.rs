//! Mock sign-in route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use soundsync_core::Role;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::CurrentUser;
use crate::models::UserSession;
use crate::services::{ProfileForm, RosterService, SessionService, SignInForm};
use crate::state::AppState;

/// Who is signed in, with the role the roster grants right now.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Option<UserSession>,
    pub role: Role,
}

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/sign_in.html")]
pub struct SignInTemplate {
    pub user_name: Option<String>,
    pub cart_count: u32,
}

/// Display the sign-in form.
#[instrument(skip(state))]
pub async fn sign_in_page(State(state): State<AppState>) -> Result<SignInTemplate> {
    let header = state.header()?;
    Ok(SignInTemplate {
        user_name: header.user.map(|user| user.name),
        cart_count: header.cart.count,
    })
}

/// Sign in.
#[instrument(skip(state, form))]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(form): Json<SignInForm>,
) -> Result<Json<UserSession>> {
    let session = SessionService::new(state.storage()).sign_in(form)?;
    set_sentry_user(session.email.as_str());
    Ok(Json(session))
}

/// Sign out; the cart is kept.
#[instrument(skip(state))]
pub async fn sign_out(State(state): State<AppState>) -> Result<StatusCode> {
    SessionService::new(state.storage()).sign_out()?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The current session.
#[instrument(skip(state, user))]
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MeResponse>> {
    let role = match &user {
        Some(session) => RosterService::new(state.storage()).effective_role(session)?,
        None => Role::User,
    };
    Ok(Json(MeResponse { user, role }))
}

/// Edit the display name or avatar.
#[instrument(skip(state, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<UserSession>> {
    Ok(Json(SessionService::new(state.storage()).update_profile(form)?))
}

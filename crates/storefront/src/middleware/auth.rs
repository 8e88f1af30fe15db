//! Session extractors for route handlers.
//!
//! Sign-in is mocked, so these only read the profile's `user` key. Admin
//! extractors never trust the role cached on the session: the admin roster
//! is consulted on every request, so a deactivated entry loses access
//! immediately.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use soundsync_core::Role;

use crate::error::AppError;
use crate::models::UserSession;
use crate::services::{RosterService, SessionService};
use crate::state::AppState;
use crate::store::StoreError;

/// Extractor that optionally gets the signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct CurrentUser(pub Option<UserSession>);

/// Extractor that requires a signed-in user.
pub struct SignedIn(pub UserSession);

/// Extractor that requires an effective admin (or super admin) role.
pub struct RequireAdmin(pub UserSession);

/// Extractor that requires an effective super admin role.
pub struct RequireSuperAdmin(pub UserSession);

/// Error returned when a request lacks the required session or role.
#[derive(Debug)]
pub enum AuthRejection {
    /// Nobody is signed in.
    Unauthorized,
    /// Signed in, but the roster does not grant the role.
    Forbidden(&'static str),
    /// The profile could not be read.
    Storage(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Sign in required").into_response(),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message).into_response(),
            Self::Storage(err) => err.into_response(),
        }
    }
}

impl From<StoreError> for AuthRejection {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.into())
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(SessionService::new(state.storage()).current()?))
    }
}

impl FromRequestParts<AppState> for SignedIn {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        user.map(Self).ok_or(AuthRejection::Unauthorized)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (user, role) = roster_checked(parts, state).await?;
        if !role.is_admin() {
            return Err(AuthRejection::Forbidden("Admin access required"));
        }
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (user, role) = roster_checked(parts, state).await?;
        if !role.is_super_admin() {
            return Err(AuthRejection::Forbidden(
                "Only super admins can manage the roster",
            ));
        }
        Ok(Self(user))
    }
}

async fn roster_checked(
    parts: &mut Parts,
    state: &AppState,
) -> Result<(UserSession, Role), AuthRejection> {
    let SignedIn(user) = SignedIn::from_request_parts(parts, state).await?;
    let role = RosterService::new(state.storage()).effective_role(&user)?;
    tracing::Span::current().record("user_role", role.as_str());
    Ok((user, role))
}

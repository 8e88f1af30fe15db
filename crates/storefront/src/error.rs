//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::{
    CarouselError, CartError, CatalogError, CheckoutError, RosterError, SellerError, SessionError,
};
use crate::store::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Profile storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Carousel(#[from] CarouselError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Seller(#[from] SellerError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not signed in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is signed in but lacks the role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store(_)
            | Self::Internal(_)
            | Self::Cart(CartError::Store(_))
            | Self::Checkout(CheckoutError::Store(_))
            | Self::Catalog(CatalogError::Store(_))
            | Self::Carousel(CarouselError::Store(_))
            | Self::Session(SessionError::Store(_))
            | Self::Seller(SellerError::Store(_))
            | Self::Roster(RosterError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,

            Self::NotFound(_)
            | Self::Cart(CartError::UnknownTrack(_) | CartError::NotInCart(_))
            | Self::Catalog(CatalogError::NotFound(_))
            | Self::Carousel(CarouselError::NotFound(_))
            | Self::Seller(SellerError::ApplicantNotFound(_))
            | Self::Roster(RosterError::NotFound(_)) => StatusCode::NOT_FOUND,

            Self::Unauthorized(_)
            | Self::Checkout(CheckoutError::NotSignedIn)
            | Self::Session(SessionError::NotSignedIn)
            | Self::Seller(SellerError::NotSignedIn) => StatusCode::UNAUTHORIZED,

            Self::Forbidden(_) | Self::Seller(SellerError::Blocked) => StatusCode::FORBIDDEN,

            Self::Cart(CartError::OutOfStock(_))
            | Self::Seller(SellerError::NotReadyForApproval | SellerError::SessionChanged) => {
                StatusCode::CONFLICT
            }

            Self::BadRequest(_)
            | Self::Checkout(CheckoutError::EmptyCart | CheckoutError::InvalidService(_))
            | Self::Catalog(CatalogError::Validation(_))
            | Self::Carousel(CarouselError::Validation(_))
            | Self::Session(SessionError::Validation(_) | SessionError::InvalidEmail(_))
            | Self::Seller(
                SellerError::Validation(_)
                | SellerError::UnsupportedFile(_)
                | SellerError::TaxFormMismatch { .. },
            ) => StatusCode::BAD_REQUEST,
        }
    }

    /// The message shown to the client.
    fn public_message(&self) -> String {
        match self {
            err if err.status().is_server_error() => "Internal server error".to_string(),
            Self::Session(SessionError::InvalidEmail(_)) => "Invalid email address".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        // Don't expose internal error details to clients
        (status, self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in email.
///
/// Call this after sign-in to associate errors with the profile's user.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use soundsync_core::TrackId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("track 12".to_string());
        assert_eq!(err.to_string(), "Not found: track 12");

        let err = AppError::from(CartError::NotInCart(TrackId::new(4)));
        assert_eq!(err.to_string(), "track 4 is not in the cart");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CheckoutError::NotSignedIn.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(CheckoutError::EmptyCart.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(SellerError::Blocked.into()), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(CartError::OutOfStock(TrackId::new(1)).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CatalogError::Validation("missing required fields: title".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AppError::from(StoreError::InvalidKey("../etc".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::from(CatalogError::Validation("missing required fields: title".into()));
        assert_eq!(err.public_message(), "missing required fields: title");
    }
}

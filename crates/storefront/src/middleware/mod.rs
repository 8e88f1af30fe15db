//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span with `request_id` and `user_role` fields)
//! 3. Request ID (record on the span, echo in the response)

pub mod auth;
pub mod request_id;

pub use auth::{AuthRejection, CurrentUser, RequireAdmin, RequireSuperAdmin, SignedIn};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

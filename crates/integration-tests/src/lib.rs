//! Integration tests for the SoundSync storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p soundsync-integration-tests
//! ```
//!
//! Tests drive the full router with `tower::ServiceExt::oneshot` against an
//! in-memory profile (or a `FileStore` in a temporary directory). Nothing
//! listens on a socket.
//!
//! # Test Categories
//!
//! - `cart_checkout` - Cart merging, totals, checkout and service booking
//! - `admin_access` - Roster-based access and catalog moderation
//! - `seller_flow` - Onboarding steps, moderation and the blocked redirect
//! - `profile_storage` - Malformed documents and the file-backed store
//! - `event_stream` - Signals delivered over `GET /events`

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use soundsync_core::{Email, Role};
use soundsync_storefront::config::{ApprovalConfig, SimulatedDelays, StorefrontConfig};
use soundsync_storefront::services::RosterService;
use soundsync_storefront::state::AppState;
use soundsync_storefront::store::{Storage, StoreError};

/// A storefront router bound to one profile.
pub struct TestApp {
    pub storage: Storage,
    router: Router,
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON, `Value::Null` if it is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    /// A header as a string, if present and printable.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

impl TestApp {
    /// A storefront over a fresh in-memory profile, with no simulated
    /// delays and the mock approver off.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read.
    pub fn new() -> Result<Self, StoreError> {
        Self::with_storage(Storage::in_memory())
    }

    /// A storefront over an existing profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read.
    pub fn with_storage(storage: Storage) -> Result<Self, StoreError> {
        let config = StorefrontConfig {
            delays: SimulatedDelays::none(),
            approval: ApprovalConfig {
                probability: 0.0,
                ..ApprovalConfig::default()
            },
            ..StorefrontConfig::default()
        };
        let state = AppState::new(config, storage.clone())?;
        Ok(Self {
            storage,
            router: soundsync_storefront::app(state),
        })
    }

    /// Put `email` on the admin roster with `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be written.
    pub fn grant(&self, email: &str, role: Role) -> Result<(), Box<dyn std::error::Error>> {
        RosterService::new(&self.storage).upsert(Email::parse(email)?, role)?;
        Ok(())
    }

    /// Send a request and buffer the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the router fails or the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse, Box<dyn std::error::Error>> {
        let response: Response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    /// Send a request and hand back the response with its body unread, for
    /// streaming endpoints such as `/events`.
    ///
    /// # Errors
    ///
    /// Returns an error if the router fails.
    pub async fn open(&self, path: &str) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::get(path).body(Body::empty())?;
        Ok(self.router.clone().oneshot(request).await?)
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn get(&self, path: &str) -> Result<TestResponse, Box<dyn std::error::Error>> {
        self.send(Request::get(path).body(Body::empty())?).await
    }

    /// `POST path` with a URL-encoded form body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn post_form(
        &self,
        path: &str,
        form: &str,
    ) -> Result<TestResponse, Box<dyn std::error::Error>> {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))?;
        self.send(request).await
    }

    /// A JSON request with `method`.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn json(
        &self,
        method: &str,
        path: &str,
        body: &Value,
    ) -> Result<TestResponse, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body)?))?;
        self.send(request).await
    }

    /// `POST path` with an empty body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn post_empty(&self, path: &str) -> Result<TestResponse, Box<dyn std::error::Error>> {
        self.send(Request::post(path).body(Body::empty())?).await
    }

    /// Sign in through the route.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn sign_in(&self, name: &str, email: &str) -> Result<TestResponse, Box<dyn std::error::Error>> {
        self.json(
            "POST",
            "/auth/sign-in",
            &serde_json::json!({ "name": name, "email": email }),
        )
        .await
    }

    /// Create a track through the admin console.
    ///
    /// The caller must already be signed in as an admin.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn create_track(
        &self,
        title: &str,
        price: &str,
        featured: bool,
    ) -> Result<TestResponse, Box<dyn std::error::Error>> {
        self.json(
            "POST",
            "/admin/tracks",
            &serde_json::json!({
                "title": title,
                "producer": "Nova",
                "price": price,
                "genre": "trap",
                "featured": featured,
            }),
        )
        .await
    }
}

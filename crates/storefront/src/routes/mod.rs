//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (carousel + featured tracks)
//! GET  /marketplace?genre=     - In-stock tracks (JSON)
//! GET  /events                 - Server-sent signal stream
//!
//! # Cart (HTML fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge
//!
//! # Checkout
//! POST /checkout               - Simulated checkout
//! POST /services/book          - Book a service
//!
//! # Auth (mocked)
//! GET  /auth/sign-in           - Sign-in form
//! POST /auth/sign-in           - Sign in
//! POST /auth/sign-out          - Sign out (cart kept)
//! GET  /auth/me                - Current session and effective role
//! POST /auth/profile           - Edit name or avatar
//!
//! # Dashboard (signed in)
//! GET  /dashboard/purchases?kind=  - Own purchases, newest first
//! GET  /dashboard/seller           - Seller tab (redirects when blocked)
//!
//! # Seller onboarding (signed in)
//! POST /seller/apply           - Submit artist profile
//! POST /seller/upload          - Upload a sample
//! POST /seller/payment         - Set up payouts
//!
//! # Admin console (admin)
//! GET|POST          /admin/tracks
//! GET|PUT|DELETE    /admin/tracks/{id}
//! POST              /admin/tracks/{id}/featured
//! POST              /admin/tracks/{id}/stock
//! GET|POST          /admin/carousel
//! PUT|DELETE        /admin/carousel/{id}
//! POST              /admin/sellers/{email}/approve|block|unblock
//! GET               /admin/purchases
//!
//! # Admin roster (super admin)
//! GET|POST          /admin/roster
//! DELETE            /admin/roster/{email}
//! POST              /admin/roster/{email}/status
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod dashboard;
pub mod events;
pub mod home;
pub mod marketplace;
pub mod seller;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(auth::sign_in_page).post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
        .route("/me", get(auth::me))
        .route("/profile", post(auth::update_profile))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/purchases", get(dashboard::purchases))
        .route("/seller", get(dashboard::seller))
}

/// Create the seller onboarding routes router.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/apply", post(seller::apply))
        .route("/upload", post(seller::upload))
        .route("/payment", post(seller::payment))
}

/// Create the admin console routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tracks",
            get(admin::tracks::index).post(admin::tracks::create),
        )
        .route(
            "/tracks/{id}",
            get(admin::tracks::show)
                .put(admin::tracks::update)
                .delete(admin::tracks::delete),
        )
        .route("/tracks/{id}/featured", post(admin::tracks::toggle_featured))
        .route("/tracks/{id}/stock", post(admin::tracks::toggle_in_stock))
        .route(
            "/carousel",
            get(admin::carousel::index).post(admin::carousel::create),
        )
        .route(
            "/carousel/{id}",
            put(admin::carousel::update).delete(admin::carousel::delete),
        )
        .route(
            "/roster",
            get(admin::roster::index).post(admin::roster::upsert),
        )
        .route("/roster/{email}", delete(admin::roster::remove))
        .route("/roster/{email}/status", post(admin::roster::set_status))
        .route("/sellers/{email}/approve", post(admin::sellers::approve))
        .route("/sellers/{email}/block", post(admin::sellers::block))
        .route("/sellers/{email}/unblock", post(admin::sellers::unblock))
        .route("/purchases", get(admin::purchases))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        .route("/marketplace", get(marketplace::index))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout and bookings
        .route("/checkout", post(checkout::checkout))
        .route("/services/book", post(checkout::book_service))
        // Auth routes
        .nest("/auth", auth_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/seller", seller_routes())
        .nest("/admin", admin_routes())
        // Signal stream for other open pages
        .route("/events", get(events::stream))
}

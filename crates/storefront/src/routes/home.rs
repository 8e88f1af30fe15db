//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::models::{CarouselItem, Track};
use crate::services::{CarouselService, CatalogService};
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Signed-in user's display name.
    pub user_name: Option<String>,
    /// Cart badge count.
    pub cart_count: u32,
    /// Active carousel slides in display order.
    pub slides: Vec<CarouselItem>,
    /// Featured, in-stock tracks.
    pub featured: Vec<Track>,
}

/// Display the home page.
///
/// A section that cannot be read is logged and rendered empty rather than
/// failing the whole page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let slides = CarouselService::new(state.storage())
        .active()
        .unwrap_or_else(|e| {
            tracing::error!("Failed to read carousel: {e}");
            Vec::new()
        });

    let featured = CatalogService::new(state.storage())
        .featured()
        .unwrap_or_else(|e| {
            tracing::error!("Failed to read featured tracks: {e}");
            Vec::new()
        });

    let (user_name, cart_count) = match state.header() {
        Ok(header) => (header.user.map(|user| user.name), header.cart.count),
        Err(e) => {
            tracing::error!("Failed to read page header: {e}");
            (None, 0)
        }
    };

    HomeTemplate {
        user_name,
        cart_count,
        slides,
        featured,
    }
}

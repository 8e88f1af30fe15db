//! Cart route handlers.
//!
//! Mutations return HTML fragments for in-place updates and an `HX-Trigger:
//! cart-updated` header; other clients learn about the change from the
//! `/events` stream.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use tracing::instrument;

use soundsync_core::{Price, TrackId};

use crate::error::Result;
use crate::filters;
use crate::middleware::CurrentUser;
use crate::models::CartLine;
use crate::services::{CartService, CartSummary};
use crate::state::AppState;

/// Header telling the page which signal a response corresponds to.
const HX_TRIGGER: &str = "HX-Trigger";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub track_id: u32,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub track_id: u32,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub track_id: u32,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub user_name: Option<String>,
    pub cart_count: u32,
    pub lines: Vec<CartLine>,
    pub total: Price,
}

/// Cart items fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub lines: Vec<CartLine>,
    pub cart_count: u32,
    pub total: Price,
}

impl CartItemsTemplate {
    fn new(lines: Vec<CartLine>) -> Self {
        let summary = CartSummary::of(&lines);
        Self {
            lines,
            cart_count: summary.count,
            total: summary.total,
        }
    }
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub cart_count: u32,
}

/// Display cart page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    let lines = CartService::new(state.storage()).lines()?;
    let summary = CartSummary::of(&lines);
    Ok(CartShowTemplate {
        user_name: user.map(|user| user.name),
        cart_count: summary.count,
        lines,
        total: summary.total,
    })
}

/// Add one unit of a track to the cart.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<AddToCartForm>,
) -> Result<impl IntoResponse> {
    let lines = CartService::new(state.storage()).add(TrackId::new(form.track_id))?;
    Ok((
        AppendHeaders([(HX_TRIGGER, "cart-updated")]),
        CartCountTemplate {
            cart_count: CartSummary::of(&lines).count,
        },
    ))
}

/// Set a line's quantity; zero removes it.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateCartForm>,
) -> Result<impl IntoResponse> {
    let lines = CartService::new(state.storage())
        .update_quantity(TrackId::new(form.track_id), form.quantity)?;
    Ok((
        AppendHeaders([(HX_TRIGGER, "cart-updated")]),
        CartItemsTemplate::new(lines),
    ))
}

/// Remove a line.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<impl IntoResponse> {
    let lines = CartService::new(state.storage()).remove(TrackId::new(form.track_id))?;
    Ok((
        AppendHeaders([(HX_TRIGGER, "cart-updated")]),
        CartItemsTemplate::new(lines),
    ))
}

/// Cart count badge.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(CartCountTemplate {
        cart_count: state.cart_badge()?.count,
    })
}

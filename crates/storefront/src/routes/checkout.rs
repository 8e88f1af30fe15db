//! Checkout and service booking handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse},
};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::SignedIn;
use crate::services::{CheckoutService, ServiceBooking};
use crate::state::AppState;

/// Pay for the cart.
///
/// Waits the configured checkout delay; a client that disconnects before
/// then cancels the checkout and keeps its cart.
#[instrument(skip(state, user), fields(buyer = %user.email))]
pub async fn checkout(
    State(state): State<AppState>,
    SignedIn(user): SignedIn,
) -> Result<impl IntoResponse> {
    add_breadcrumb("checkout", "Checkout started", None);
    let purchase = CheckoutService::new(state.storage(), state.config().delays.checkout)
        .checkout(&user)
        .await?;

    let purchase_id = purchase.id.to_string();
    let data: &[(&str, &str)] = &[("purchase_id", purchase_id.as_str())];
    add_breadcrumb("checkout", "Checkout completed", Some(data));
    Ok((
        StatusCode::CREATED,
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        Json(purchase),
    ))
}

/// Book a service.
#[instrument(skip(state, user, booking), fields(buyer = %user.email))]
pub async fn book_service(
    State(state): State<AppState>,
    SignedIn(user): SignedIn,
    Json(booking): Json<ServiceBooking>,
) -> Result<impl IntoResponse> {
    let purchase = CheckoutService::new(state.storage(), state.config().delays.checkout)
        .book_service(&user, booking)
        .await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

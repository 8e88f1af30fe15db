//! Seller onboarding step handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::SignedIn;
use crate::models::SellerProfile;
use crate::services::{PaymentForm, SellerService, SellerStatus, UploadForm};
use crate::state::AppState;

/// Submit the artist profile.
#[instrument(skip(state, user, profile), fields(email = %user.email))]
pub async fn apply(
    State(state): State<AppState>,
    SignedIn(user): SignedIn,
    Json(profile): Json<SellerProfile>,
) -> Result<Json<SellerStatus>> {
    let status = SellerService::new(state.storage(), state.config().delays).submit_profile(profile)?;
    Ok(Json(status))
}

/// Upload a sample.
#[instrument(skip(state, user, form), fields(email = %user.email))]
pub async fn upload(
    State(state): State<AppState>,
    SignedIn(user): SignedIn,
    Json(form): Json<UploadForm>,
) -> Result<Json<SellerStatus>> {
    let status = SellerService::new(state.storage(), state.config().delays)
        .upload(form)
        .await?;
    Ok(Json(status))
}

/// Set up payouts.
#[instrument(skip(state, user, form), fields(email = %user.email))]
pub async fn payment(
    State(state): State<AppState>,
    SignedIn(user): SignedIn,
    Json(form): Json<PaymentForm>,
) -> Result<Json<SellerStatus>> {
    let status = SellerService::new(state.storage(), state.config().delays)
        .submit_payment(form)
        .await?;
    Ok(Json(status))
}

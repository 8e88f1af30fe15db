//! User dashboard: purchases tab and seller tab.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use soundsync_core::PurchaseKind;

use crate::error::Result;
use crate::middleware::SignedIn;
use crate::models::{Purchase, SellerStage};
use crate::services::{PurchaseService, SellerService};
use crate::state::AppState;

/// Where the seller tab sends a blocked seller.
pub const SELLER_BLOCKED_REDIRECT: &str = "/dashboard/purchases?warning=seller_blocked";

/// Purchases tab query parameters.
#[derive(Debug, Deserialize)]
pub struct PurchasesQuery {
    pub kind: Option<PurchaseKind>,
    pub warning: Option<String>,
}

/// Purchases tab contents.
#[derive(Debug, Serialize)]
pub struct PurchasesView {
    pub purchases: Vec<Purchase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// The signed-in user's purchases, newest first.
#[instrument(skip(state, user), fields(buyer = %user.email))]
pub async fn purchases(
    State(state): State<AppState>,
    SignedIn(user): SignedIn,
    Query(query): Query<PurchasesQuery>,
) -> Result<Json<PurchasesView>> {
    let purchases = PurchaseService::new(state.storage()).for_buyer(&user.email, query.kind)?;
    Ok(Json(PurchasesView {
        purchases,
        warning: query.warning,
    }))
}

/// Seller tab. A blocked seller is sent to the purchases tab instead.
#[instrument(skip(state, _user))]
pub async fn seller(State(state): State<AppState>, SignedIn(_user): SignedIn) -> Result<Response> {
    let status = SellerService::new(state.storage(), state.config().delays).status()?;
    if status.stage == SellerStage::Blocked {
        tracing::info!("Blocked seller redirected to purchases");
        return Ok(Redirect::to(SELLER_BLOCKED_REDIRECT).into_response());
    }
    Ok(Json(status).into_response())
}

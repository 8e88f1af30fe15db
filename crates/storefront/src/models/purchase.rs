//! Purchase records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use soundsync_core::{Email, Price, PurchaseId, PurchaseKind};

use super::cart::CartLine;

/// A completed checkout or service booking.
///
/// The `purchases` key holds the only copy; per-buyer and per-kind lists are
/// derived from it on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: PurchaseId,
    pub date: DateTime<Utc>,
    pub buyer_email: Email,
    pub items: Vec<CartLine>,
    pub total: Price,
    #[serde(rename = "type")]
    pub kind: PurchaseKind,
}

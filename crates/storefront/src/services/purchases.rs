//! The purchase ledger.
//!
//! One list under the `purchases` key holds every record. Dashboard views
//! (per buyer, per kind, everything for the admin) are filtered from it on
//! read, so there is nothing to keep in sync.

use soundsync_core::{Email, PurchaseKind};

use crate::models::Purchase;
use crate::store::{Storage, StoreError, keys};

/// Service for reading and appending purchase records.
pub struct PurchaseService<'a> {
    storage: &'a Storage,
}

impl<'a> PurchaseService<'a> {
    /// Create a new purchase service.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Every purchase, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn list_all(&self) -> Result<Vec<Purchase>, StoreError> {
        let mut purchases = self.storage.read(keys::PURCHASES)?;
        // Stored oldest first; reversing keeps same-instant records newest first.
        purchases.reverse();
        purchases.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(purchases)
    }

    /// A buyer's purchases, newest first, optionally of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn for_buyer(
        &self,
        email: &Email,
        kind: Option<PurchaseKind>,
    ) -> Result<Vec<Purchase>, StoreError> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|purchase| &purchase.buyer_email == email)
            .filter(|purchase| kind.is_none_or(|kind| purchase.kind == kind))
            .collect())
    }

    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn record(&self, purchase: Purchase) -> Result<(), StoreError> {
        tracing::info!(
            purchase_id = %purchase.id,
            kind = %purchase.kind,
            total = %purchase.total,
            "Purchase recorded"
        );
        self.storage
            .update(keys::PURCHASES, |purchases| purchases.push(purchase))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use soundsync_core::{Price, PurchaseId};

    use super::*;

    fn purchase(buyer: &str, kind: PurchaseKind, minutes_ago: i64) -> Purchase {
        Purchase {
            id: PurchaseId::generate(),
            date: Utc::now() - Duration::minutes(minutes_ago),
            buyer_email: Email::parse(buyer).unwrap(),
            items: Vec::new(),
            total: Price::from_cents(1000),
            kind,
        }
    }

    #[test]
    fn test_for_buyer_filters_and_orders() {
        let storage = Storage::in_memory();
        let ledger = PurchaseService::new(&storage);
        let old = purchase("kay@example.com", PurchaseKind::Marketplace, 30);
        let new = purchase("kay@example.com", PurchaseKind::Marketplace, 1);
        let service = purchase("kay@example.com", PurchaseKind::Service, 10);
        let other = purchase("lee@example.com", PurchaseKind::Marketplace, 5);
        for record in [old.clone(), new.clone(), service.clone(), other.clone()] {
            ledger.record(record).unwrap();
        }

        let kay = Email::parse("kay@example.com").unwrap();
        let marketplace = ledger
            .for_buyer(&kay, Some(PurchaseKind::Marketplace))
            .unwrap();
        assert_eq!(marketplace, vec![new.clone(), old.clone()]);

        let everything = ledger.for_buyer(&kay, None).unwrap();
        assert_eq!(everything, vec![new, service, old]);

        assert_eq!(ledger.list_all().unwrap().len(), 4);
        let ids: Vec<PurchaseId> = ledger.list_all().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids.get(1), Some(&other.id));
    }
}

//! Simulated checkout and service booking.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use soundsync_core::{Price, PurchaseId, PurchaseKind, TrackId};

use crate::models::cart::cart_total;
use crate::models::{CartLine, Purchase, UserSession};
use crate::services::{CartService, PurchaseService};
use crate::store::{Storage, StoreError};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("sign in to check out")]
    NotSignedIn,

    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid service booking: {0}")]
    InvalidService(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A service booking request.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceBooking {
    pub title: String,
    pub price: Price,
}

/// Service that turns carts and bookings into purchase records.
pub struct CheckoutService<'a> {
    storage: &'a Storage,
    delay: Duration,
}

impl<'a> CheckoutService<'a> {
    /// Create a checkout service waiting `delay` to simulate payment.
    #[must_use]
    pub const fn new(storage: &'a Storage, delay: Duration) -> Self {
        Self { storage, delay }
    }

    /// Pay for the cart.
    ///
    /// Appends exactly one marketplace purchase holding the cart as it was
    /// when checkout started, then takes those lines out of the cart. Items
    /// added while payment is processing stay in the cart. If the purchase
    /// cannot be recorded the lines are put back.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotSignedIn` for a signed-out session and
    /// `CheckoutError::EmptyCart` when there is nothing to buy.
    #[instrument(skip(self, session), fields(buyer = %session.email))]
    pub async fn checkout(&self, session: &UserSession) -> Result<Purchase, CheckoutError> {
        if !session.signed_in {
            return Err(CheckoutError::NotSignedIn);
        }
        let cart = CartService::new(self.storage);
        let lines = cart.lines()?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.simulate_payment().await;

        cart.take(&lines)?;
        let purchase = new_purchase(session, lines, PurchaseKind::Marketplace);
        if let Err(e) = PurchaseService::new(self.storage).record(purchase.clone()) {
            tracing::error!(error = %e, "Failed to record purchase, restoring cart");
            cart.restore(purchase.items)?;
            return Err(e.into());
        }

        Ok(purchase)
    }

    /// Book a service (mixing, mastering, custom production).
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotSignedIn` for a signed-out session and
    /// `CheckoutError::InvalidService` for a blank title.
    #[instrument(skip(self, session, booking), fields(buyer = %session.email, service = %booking.title))]
    pub async fn book_service(
        &self,
        session: &UserSession,
        booking: ServiceBooking,
    ) -> Result<Purchase, CheckoutError> {
        if !session.signed_in {
            return Err(CheckoutError::NotSignedIn);
        }
        let title = booking.title.trim();
        if title.is_empty() {
            return Err(CheckoutError::InvalidService("title is required".to_owned()));
        }

        self.simulate_payment().await;

        let line = CartLine {
            id: TrackId::new(0),
            title: title.to_owned(),
            price: booking.price,
            image_url: String::new(),
            producer: String::new(),
            quantity: 1,
        };
        let purchase = new_purchase(session, vec![line], PurchaseKind::Service);
        PurchaseService::new(self.storage).record(purchase.clone())?;
        Ok(purchase)
    }

    async fn simulate_payment(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

fn new_purchase(session: &UserSession, items: Vec<CartLine>, kind: PurchaseKind) -> Purchase {
    Purchase {
        id: PurchaseId::generate(),
        date: Utc::now(),
        buyer_email: session.email.clone(),
        total: cart_total(&items),
        items,
        kind,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use soundsync_core::Email;

    use super::*;
    use crate::models::cart::merge_line;
    use crate::store::keys;

    fn session() -> UserSession {
        UserSession {
            signed_in: true,
            name: "Kay".to_string(),
            email: Email::parse("kay@example.com").unwrap(),
            avatar_url: None,
            role: None,
            seller: None,
        }
    }

    fn line(id: u32, cents: i64, quantity: u32) -> CartLine {
        CartLine {
            id: TrackId::new(id),
            title: format!("Beat {id}"),
            price: Price::from_cents(cents),
            image_url: String::new(),
            producer: "Kay".to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_checkout_snapshots_and_clears() {
        let storage = Storage::in_memory();
        let snapshot = vec![line(1, 1000, 2), line(2, 499, 1)];
        storage.write(keys::CART, &snapshot).unwrap();

        let purchase = CheckoutService::new(&storage, Duration::ZERO)
            .checkout(&session())
            .await
            .unwrap();

        assert_eq!(purchase.items, snapshot);
        assert_eq!(purchase.total.to_string(), "$24.99");
        assert_eq!(purchase.kind, PurchaseKind::Marketplace);
        assert!(CartService::new(&storage).lines().unwrap().is_empty());
        assert_eq!(PurchaseService::new(&storage).list_all().unwrap(), vec![purchase]);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let storage = Storage::in_memory();
        let result = CheckoutService::new(&storage, Duration::ZERO)
            .checkout(&session())
            .await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert!(PurchaseService::new(&storage).list_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_requires_sign_in() {
        let storage = Storage::in_memory();
        storage.write(keys::CART, &vec![line(1, 1000, 1)]).unwrap();
        let mut signed_out = session();
        signed_out.signed_in = false;

        let result = CheckoutService::new(&storage, Duration::ZERO)
            .checkout(&signed_out)
            .await;
        assert!(matches!(result, Err(CheckoutError::NotSignedIn)));
        assert_eq!(CartService::new(&storage).lines().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_book_service_records_service_purchase() {
        let storage = Storage::in_memory();
        let checkout = CheckoutService::new(&storage, Duration::ZERO);
        let purchase = checkout
            .book_service(
                &session(),
                ServiceBooking {
                    title: "Mixing".to_string(),
                    price: Price::from_cents(15_000),
                },
            )
            .await
            .unwrap();
        assert_eq!(purchase.kind, PurchaseKind::Service);
        assert_eq!(purchase.total.to_string(), "$150.00");

        let blank = checkout
            .book_service(
                &session(),
                ServiceBooking {
                    title: "  ".to_string(),
                    price: Price::ZERO,
                },
            )
            .await;
        assert!(matches!(blank, Err(CheckoutError::InvalidService(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_waits_for_delay() {
        let storage = Storage::in_memory();
        storage.write(keys::CART, &vec![line(1, 1000, 1)]).unwrap();
        let start = tokio::time::Instant::now();

        CheckoutService::new(&storage, Duration::from_millis(1000))
            .checkout(&session())
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lines_added_during_payment_stay_in_cart() {
        let storage = Storage::in_memory();
        storage.write(keys::CART, &vec![line(1, 1000, 1)]).unwrap();
        let checkout = CheckoutService::new(&storage, Duration::from_millis(1000));

        let late_adds = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            storage
                .update(keys::CART, |lines| {
                    merge_line(lines, line(2, 5000, 1));
                    merge_line(lines, line(1, 1000, 1));
                })
                .unwrap();
        };
        let buyer = session();
        let (purchase, ()) = tokio::join!(checkout.checkout(&buyer), late_adds);
        let purchase = purchase.unwrap();

        assert_eq!(purchase.items, vec![line(1, 1000, 1)]);
        assert_eq!(purchase.total.to_string(), "$10.00");
        assert_eq!(
            CartService::new(&storage).lines().unwrap(),
            vec![line(1, 1000, 1), line(2, 5000, 1)]
        );
    }
}

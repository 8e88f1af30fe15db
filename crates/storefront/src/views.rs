//! Live view models.
//!
//! A view model is display state derived from the profile. A [`LiveView`]
//! keeps one up to date: it subscribes to the [`EventBus`](crate::events::EventBus)
//! before its first read, and re-derives whenever a signal that may affect it
//! has arrived since. It never receives state through the signal itself.
//!
//! Refreshing is pull-based. Handlers call [`LiveView::current`], which
//! drains pending signals without waiting, so a request that follows a
//! write in the same process always sees that write.

use serde::Serialize;

use crate::events::{Signal, Subscription};
use crate::models::UserSession;
use crate::services::{CartService, CartSummary, SessionService};
use crate::store::{Storage, StoreError, keys};

/// Display state that can be re-derived from storage.
pub trait ViewModel: Sized {
    /// Whether `signal` may change this view. [`Signal::Resync`] always does.
    fn is_affected_by(signal: &Signal) -> bool;

    /// Build the view from the current profile.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    fn derive(storage: &Storage) -> Result<Self, StoreError>;
}

impl ViewModel for CartSummary {
    fn is_affected_by(signal: &Signal) -> bool {
        matches!(signal, Signal::CartUpdated) || signal.touches(keys::CART.name())
    }

    fn derive(storage: &Storage) -> Result<Self, StoreError> {
        CartService::new(storage).summary()
    }
}

/// Page header: who is signed in and the cart badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderView {
    pub user: Option<UserSession>,
    pub cart: CartSummary,
}

impl ViewModel for HeaderView {
    fn is_affected_by(signal: &Signal) -> bool {
        matches!(signal, Signal::UserUpdated)
            || signal.touches(keys::USER.name())
            || CartSummary::is_affected_by(signal)
    }

    fn derive(storage: &Storage) -> Result<Self, StoreError> {
        Ok(Self {
            user: SessionService::new(storage).current()?,
            cart: CartSummary::derive(storage)?,
        })
    }
}

/// A view model kept current by bus signals.
#[derive(Debug)]
pub struct LiveView<V> {
    storage: Storage,
    subscription: Subscription,
    state: V,
    stale: bool,
    refreshes: u64,
}

impl<V: ViewModel> LiveView<V> {
    /// Subscribe and derive the initial state.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn new(storage: Storage) -> Result<Self, StoreError> {
        // Subscribe first so a write racing the initial read is not missed.
        let subscription = storage.events().subscribe();
        let state = V::derive(&storage)?;
        Ok(Self {
            storage,
            subscription,
            state,
            stale: false,
            refreshes: 0,
        })
    }

    /// The view, re-derived first if a relevant signal arrived.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read. The previous state is
    /// kept and the view stays marked for refresh.
    pub fn current(&mut self) -> Result<&V, StoreError> {
        while let Some(signal) = self.subscription.try_recv() {
            self.stale |= signal == Signal::Resync || V::is_affected_by(&signal);
        }
        if self.stale {
            self.state = V::derive(&self.storage)?;
            self.stale = false;
            self.refreshes += 1;
        }
        Ok(&self.state)
    }

    /// How many times the view has been re-derived since construction.
    #[must_use]
    pub const fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

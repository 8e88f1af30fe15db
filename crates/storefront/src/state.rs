//! Application state shared across handlers.

use std::sync::{Arc, Mutex, PoisonError};

use crate::config::StorefrontConfig;
use crate::services::CartSummary;
use crate::store::{Storage, StoreError};
use crate::views::{HeaderView, LiveView};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// profile's storage and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: Storage,
    header: Mutex<LiveView<HeaderView>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read.
    pub fn new(config: StorefrontConfig, storage: Storage) -> Result<Self, StoreError> {
        let header = Mutex::new(LiveView::new(storage.clone())?);
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                header,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the profile storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.inner.storage
    }

    /// Current page header, refreshed from pending signals.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or cart cannot be read.
    pub fn header(&self) -> Result<HeaderView, StoreError> {
        let mut header = self
            .inner
            .header
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        header.current().cloned()
    }

    /// Current cart badge.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be read.
    pub fn cart_badge(&self) -> Result<CartSummary, StoreError> {
        self.header().map(|header| header.cart)
    }
}

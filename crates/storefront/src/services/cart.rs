//! Cart operations.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use soundsync_core::{Price, TrackId};

use crate::events::Signal;
use crate::models::cart::{cart_total, item_count, merge_line, subtract_lines};
use crate::models::{CartLine, Track};
use crate::services::CatalogService;
use crate::store::{Storage, StoreError, keys};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("track {0} is not in the catalog")]
    UnknownTrack(TrackId),

    #[error("track {0} is out of stock")]
    OutOfStock(TrackId),

    #[error("track {0} is not in the cart")]
    NotInCart(TrackId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cart badge data: item count and formatted total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub count: u32,
    pub total: Price,
}

impl CartSummary {
    /// Summarize a list of lines.
    #[must_use]
    pub fn of(lines: &[CartLine]) -> Self {
        Self {
            count: item_count(lines),
            total: cart_total(lines),
        }
    }
}

/// Service for the profile's cart.
pub struct CartService<'a> {
    storage: &'a Storage,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Current cart lines, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn lines(&self) -> Result<Vec<CartLine>, StoreError> {
        self.storage.read(keys::CART)
    }

    /// Item count and total of the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn summary(&self) -> Result<CartSummary, StoreError> {
        Ok(CartSummary::of(&self.lines()?))
    }

    /// Sum of line quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn count(&self) -> Result<u32, StoreError> {
        Ok(item_count(&self.lines()?))
    }

    /// Sum of price times quantity over every line.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn total(&self) -> Result<Price, StoreError> {
        Ok(cart_total(&self.lines()?))
    }

    /// Add one unit of a catalog track.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownTrack` if the track is not in the catalog
    /// and `CartError::OutOfStock` if it cannot be bought right now.
    #[instrument(skip(self))]
    pub fn add(&self, track_id: TrackId) -> Result<Vec<CartLine>, CartError> {
        let track = CatalogService::new(self.storage)
            .get(track_id)?
            .ok_or(CartError::UnknownTrack(track_id))?;
        self.add_track(&track)
    }

    /// Add one unit of `track`, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::OutOfStock` if the track is not in stock.
    pub fn add_track(&self, track: &Track) -> Result<Vec<CartLine>, CartError> {
        if !track.in_stock {
            return Err(CartError::OutOfStock(track.id));
        }

        let lines = self.storage.update(keys::CART, |lines| {
            merge_line(lines, CartLine::for_track(track));
            lines.clone()
        })?;

        tracing::info!(track_id = %track.id, "Added to cart");
        self.changed();
        Ok(lines)
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if there is no line for `track_id`.
    #[instrument(skip(self))]
    pub fn update_quantity(
        &self,
        track_id: TrackId,
        quantity: u32,
    ) -> Result<Vec<CartLine>, CartError> {
        let lines = self.storage.try_update(keys::CART, |lines| {
            let position = lines
                .iter()
                .position(|line| line.id == track_id)
                .ok_or(CartError::NotInCart(track_id))?;
            if quantity == 0 {
                lines.remove(position);
            } else if let Some(line) = lines.get_mut(position) {
                line.quantity = quantity;
            }
            Ok::<_, CartError>(lines.clone())
        })?;

        self.changed();
        Ok(lines)
    }

    /// Remove the line for `track_id`, leaving every other line untouched.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if there is no line for `track_id`.
    #[instrument(skip(self))]
    pub fn remove(&self, track_id: TrackId) -> Result<Vec<CartLine>, CartError> {
        let lines = self.storage.try_update(keys::CART, |lines| {
            let position = lines
                .iter()
                .position(|line| line.id == track_id)
                .ok_or(CartError::NotInCart(track_id))?;
            lines.remove(position);
            Ok::<_, CartError>(lines.clone())
        })?;

        self.changed();
        Ok(lines)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage.write(keys::CART, &Vec::new())?;
        self.changed();
        Ok(())
    }

    /// Remove exactly the quantities in `paid` from the cart.
    pub(crate) fn take(&self, paid: &[CartLine]) -> Result<(), StoreError> {
        self.storage.update(keys::CART, |lines| subtract_lines(lines, paid))?;
        self.changed();
        Ok(())
    }

    /// Put lines back after a failed checkout.
    pub(crate) fn restore(&self, restored: Vec<CartLine>) -> Result<(), StoreError> {
        self.storage.update(keys::CART, |lines| {
            for line in restored {
                merge_line(lines, line);
            }
        })?;
        self.changed();
        Ok(())
    }

    fn changed(&self) {
        self.storage.events().emit(Signal::CartUpdated);
    }
}

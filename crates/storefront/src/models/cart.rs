//! Cart lines and the pure cart arithmetic.

use serde::{Deserialize, Serialize};

use soundsync_core::{Price, TrackId};

use super::catalog::Track;

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: TrackId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub producer: String,
    pub quantity: u32,
}

impl CartLine {
    /// A single-quantity line for a catalog track.
    #[must_use]
    pub fn for_track(track: &Track) -> Self {
        Self {
            id: track.id,
            title: track.title.clone(),
            price: track.price,
            image_url: track.image_url.clone(),
            producer: track.producer.clone(),
            quantity: 1,
        }
    }

    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Add `line` to `lines`, merging with an existing line for the same item.
///
/// Merging adds quantities instead of duplicating the line.
pub fn merge_line(lines: &mut Vec<CartLine>, line: CartLine) {
    match lines.iter_mut().find(|existing| existing.id == line.id) {
        Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
        None => lines.push(line),
    }
}

/// Take `taken` out of `lines`, quantity by quantity.
///
/// Lines whose quantity reaches zero are dropped. Anything in `lines`
/// beyond what `taken` holds is left in place.
pub fn subtract_lines(lines: &mut Vec<CartLine>, taken: &[CartLine]) {
    for gone in taken {
        if let Some(existing) = lines.iter_mut().find(|line| line.id == gone.id) {
            existing.quantity = existing.quantity.saturating_sub(gone.quantity);
        }
    }
    lines.retain(|line| line.quantity > 0);
}

/// Sum of every line's price times quantity.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Price {
    lines.iter().map(CartLine::line_total).sum()
}

/// Number of items in the cart (sum of quantities).
#[must_use]
pub fn item_count(lines: &[CartLine]) -> u32 {
    lines
        .iter()
        .fold(0_u32, |count, line| count.saturating_add(line.quantity))
}

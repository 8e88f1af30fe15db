//! Storage layout of a storefront profile.
//!
//! | Key            | Contents                                   |
//! |----------------|--------------------------------------------|
//! | `user`         | signed-in session, `null` when signed out  |
//! | `cart`         | ordered cart lines                         |
//! | `purchases`    | every purchase record, oldest first        |
//! | `tracks`       | marketplace catalog                        |
//! | `carousel`     | home page carousel slides                  |
//! | `admin_roster` | admin console access list                  |

use super::Key;
use crate::models::{CarouselItem, CartLine, Purchase, RosterEntry, Track, UserSession};

pub const USER: Key<Option<UserSession>> = Key::new("user");
pub const CART: Key<Vec<CartLine>> = Key::new("cart");
pub const PURCHASES: Key<Vec<Purchase>> = Key::new("purchases");
pub const TRACKS: Key<Vec<Track>> = Key::new("tracks");
pub const CAROUSEL: Key<Vec<CarouselItem>> = Key::new("carousel");
pub const ADMIN_ROSTER: Key<Vec<RosterEntry>> = Key::new("admin_roster");

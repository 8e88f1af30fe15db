//! Domain models stored in a storefront profile.
//!
//! Field names serialize in camelCase, matching the documents a browser
//! profile of the storefront holds.

pub mod carousel;
pub mod cart;
pub mod catalog;
pub mod purchase;
pub mod roster;
pub mod seller;
pub mod session;

pub use carousel::{CarouselInput, CarouselItem};
pub use cart::CartLine;
pub use catalog::{Track, TrackInput};
pub use purchase::Purchase;
pub use roster::RosterEntry;
pub use seller::{
    PayoutDetails, PayoutMethod, SellerApplication, SellerProfile, SellerStage, TaxFormKind,
    UploadedFile,
};
pub use session::UserSession;

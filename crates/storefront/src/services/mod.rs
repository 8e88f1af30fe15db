//! Business logic services for the storefront.
//!
//! Each service borrows the profile's [`Storage`](crate::store::Storage) and
//! owns one concern. Mutations go through a single read-modify-write block
//! and emit the matching [`Signal`](crate::events::Signal) afterwards.
//!
//! # Services
//!
//! - `cart` - Cart lines, quantity merging, totals
//! - `checkout` - Simulated payment and purchase creation
//! - `purchases` - The purchase ledger and its derived views
//! - `catalog` - Marketplace tracks (admin CRUD, featured/in-stock flags)
//! - `carousel` - Home page slides
//! - `session` - Mock sign-in and profile edits
//! - `roster` - Admin roster and effective roles
//! - `seller` - Seller onboarding steps and moderation
//! - `approval` - Randomized mock approver

pub mod approval;
pub mod carousel;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod purchases;
pub mod roster;
pub mod seller;
pub mod session;

pub use approval::{ApprovalHandle, ApprovalSimulator};
pub use carousel::{CarouselError, CarouselService};
pub use cart::{CartError, CartService, CartSummary};
pub use catalog::{CatalogError, CatalogService};
pub use checkout::{CheckoutError, CheckoutService, ServiceBooking};
pub use purchases::PurchaseService;
pub use roster::{RosterError, RosterService};
pub use seller::{PaymentForm, SellerError, SellerService, SellerStatus, UploadForm};
pub use session::{ProfileForm, SessionError, SessionService, SignInForm};

/// Message listing blank required fields.
pub(crate) fn missing_fields_message(fields: &[&str]) -> String {
    format!("missing required fields: {}", fields.join(", "))
}

//! SoundSync Core - Shared types library.
//!
//! This crate provides common types used across all SoundSync components:
//! - `storefront` - Storefront server (marketplace, cart, seller onboarding, admin console)
//! - `cli` - Command-line tools for seeding and managing a storefront profile
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, roles and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

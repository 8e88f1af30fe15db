//! Seed a profile's catalog and carousel from a YAML file.
//!
//! # File format
//!
//! ```yaml
//! tracks:
//!   - title: Midnight Drive
//!     producer: Nova
//!     price: "$24.99"
//!     genre: trap
//!     featured: true
//! carousel:
//!   - title: New drops
//!     imageUrl: /img/drops.jpg
//!     isActive: true
//! ```
//!
//! Field names follow the admin console forms. Every entry goes through the
//! same validation as the console, and new IDs are assigned on insert.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use soundsync_storefront::models::{CarouselInput, TrackInput};
use soundsync_storefront::services::{CarouselError, CarouselService, CatalogError, CatalogService};
use soundsync_storefront::store::{Storage, StoreError, keys};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Track {index}: {source}")]
    Track {
        index: usize,
        #[source]
        source: CatalogError,
    },

    #[error("Carousel item {index}: {source}")]
    Carousel {
        index: usize,
        #[source]
        source: CarouselError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parsed seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub tracks: Vec<TrackInput>,
    pub carousel: Vec<CarouselInput>,
}

/// What a seed run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub tracks: usize,
    pub carousel: usize,
}

/// Load `file_path` into the profile.
///
/// With `replace`, existing tracks and slides are dropped first; otherwise
/// the seeded entries are appended.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, an entry fails
/// validation, or the profile cannot be written.
pub async fn from_file(
    storage: &Storage,
    file_path: &str,
    replace: bool,
) -> Result<SeedSummary, SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::NotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading seed file");
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;
    info!(
        tracks = seed.tracks.len(),
        carousel = seed.carousel.len(),
        "Parsed seed file"
    );

    let summary = apply(storage, seed, replace)?;

    info!("Seeding complete!");
    info!("  Tracks inserted: {}", summary.tracks);
    info!("  Carousel items inserted: {}", summary.carousel);
    Ok(summary)
}

/// Insert a parsed seed into the profile.
///
/// # Errors
///
/// Stops at the first entry that fails validation. Entries before it stay
/// inserted.
pub fn apply(storage: &Storage, seed: SeedFile, replace: bool) -> Result<SeedSummary, SeedError> {
    if replace {
        storage.remove(keys::TRACKS)?;
        storage.remove(keys::CAROUSEL)?;
        info!("Cleared existing tracks and carousel");
    }

    let catalog = CatalogService::new(storage);
    let mut summary = SeedSummary::default();
    for (index, input) in seed.tracks.into_iter().enumerate() {
        catalog
            .create(input)
            .map_err(|source| SeedError::Track { index, source })?;
        summary.tracks += 1;
    }

    let carousel = CarouselService::new(storage);
    for (index, input) in seed.carousel.into_iter().enumerate() {
        carousel
            .create(input)
            .map_err(|source| SeedError::Carousel { index, source })?;
        summary.carousel += 1;
    }

    Ok(summary)
}

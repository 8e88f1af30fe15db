//! Command implementations.
//!
//! Every command works on a file-backed profile directory, the same one the
//! storefront opens when `SOUNDSYNC_DATA_DIR` is set.

pub mod admin;
pub mod seed;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;

use soundsync_storefront::events::EventBus;
use soundsync_storefront::store::{FileStore, Storage, StoreError};

/// Errors shared by every command.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Neither `--data-dir` nor `SOUNDSYNC_DATA_DIR` was given.
    #[error("Missing profile directory: pass --data-dir or set SOUNDSYNC_DATA_DIR")]
    MissingDataDir,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Open the profile at `data_dir`, falling back to `SOUNDSYNC_DATA_DIR`.
///
/// # Errors
///
/// Returns an error if no directory is configured or it cannot be created.
pub fn open_profile(data_dir: Option<PathBuf>) -> Result<Storage, ProfileError> {
    dotenvy::dotenv().ok();

    let dir = data_dir
        .or_else(|| {
            std::env::var("SOUNDSYNC_DATA_DIR")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        })
        .ok_or(ProfileError::MissingDataDir)?;

    let store = FileStore::open(dir)?;
    tracing::info!(dir = %store.dir().display(), "Opened profile");
    Ok(Storage::new(store, EventBus::new()))
}

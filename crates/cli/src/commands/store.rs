//! Profile inspection commands.

use soundsync_storefront::store::{Storage, StoreError};

/// List the keys stored in a profile.
///
/// # Errors
///
/// Returns an error if the profile directory cannot be listed.
pub fn keys(storage: &Storage) -> Result<Vec<String>, StoreError> {
    let keys = storage.backend().keys()?;
    if keys.is_empty() {
        tracing::info!("Profile is empty");
    }
    for key in &keys {
        tracing::info!("  {key}");
    }
    Ok(keys)
}

//! Admin roster management commands.
//!
//! # Usage
//!
//! ```bash
//! # Grant console access
//! ss-cli admin create -e admin@example.com -r superadmin
//!
//! # Revoke access without deleting the entry
//! ss-cli admin deactivate -e admin@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `SOUNDSYNC_DATA_DIR` - Profile directory (or pass `--data-dir`)

use soundsync_core::{Email, Role, RosterStatus};
use soundsync_storefront::models::RosterEntry;
use soundsync_storefront::services::{RosterError, RosterService};
use soundsync_storefront::store::{Storage, StoreError};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: superadmin, admin, user")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No roster entry for the email.
    #[error("No roster entry for: {0}")]
    NotFound(Email),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RosterError> for AdminError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::NotFound(email) => Self::NotFound(email),
            RosterError::Store(e) => Self::Store(e),
        }
    }
}

fn parse_email(email: &str) -> Result<Email, AdminError> {
    Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))
}

/// Add or replace a roster entry. The entry is always active.
///
/// # Errors
///
/// Returns an error if the email or role is invalid, or the profile cannot
/// be written.
pub fn create(storage: &Storage, email: &str, role: &str) -> Result<RosterEntry, AdminError> {
    let role: Role = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;
    let email = parse_email(email)?;

    let roster = RosterService::new(storage);
    if roster.lookup(&email)?.is_some() {
        tracing::warn!("Replacing existing roster entry for {}", email);
    }

    let entry = roster.upsert(email, role)?;
    tracing::info!(
        "Roster entry saved! Email: {}, Role: {}, Status: {}",
        entry.email,
        entry.role,
        entry.status
    );
    Ok(entry)
}

/// Mark a roster entry inactive.
///
/// An inactive entry grants no admin access, even to a session that was
/// signed in while it was active.
///
/// # Errors
///
/// Returns `AdminError::NotFound` if the email is not on the roster.
pub fn deactivate(storage: &Storage, email: &str) -> Result<RosterEntry, AdminError> {
    let email = parse_email(email)?;
    let entry = RosterService::new(storage).set_status(&email, RosterStatus::Inactive)?;
    tracing::info!("Roster entry deactivated: {}", entry.email);
    Ok(entry)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_deactivate() {
        let storage = Storage::in_memory();
        let entry = create(&storage, " Boss@Example.com ", "superadmin").unwrap();
        assert_eq!(entry.email.as_str(), "boss@example.com");
        assert_eq!(entry.role, Role::SuperAdmin);

        let entry = deactivate(&storage, "boss@example.com").unwrap();
        assert_eq!(entry.status, RosterStatus::Inactive);
        assert_eq!(
            RosterService::new(&storage).role_for(&entry.email).unwrap(),
            Role::User
        );
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let storage = Storage::in_memory();
        assert!(matches!(
            create(&storage, "a@example.com", "owner"),
            Err(AdminError::InvalidRole(_))
        ));
        assert!(matches!(
            create(&storage, "not-an-email", "admin"),
            Err(AdminError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_deactivate_unknown() {
        let storage = Storage::in_memory();
        assert!(matches!(
            deactivate(&storage, "ghost@example.com"),
            Err(AdminError::NotFound(_))
        ));
    }
}

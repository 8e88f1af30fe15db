//! Admin roster and effective roles.
//!
//! The roster is the only authority for admin access. A role cached on the
//! session is copied from here at sign-in for display, but access checks
//! always look the email up again, so deactivating an entry takes effect on
//! the very next request.

use thiserror::Error;
use tracing::instrument;

use soundsync_core::{Email, Role, RosterStatus};

use crate::models::{RosterEntry, UserSession};
use crate::store::{Storage, StoreError, keys};

/// Errors that can occur during roster operations.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("{0} is not on the admin roster")]
    NotFound(Email),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service for the admin roster.
pub struct RosterService<'a> {
    storage: &'a Storage,
}

impl<'a> RosterService<'a> {
    /// Create a new roster service.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Every roster entry, in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn list(&self) -> Result<Vec<RosterEntry>, StoreError> {
        self.storage.read(keys::ADMIN_ROSTER)
    }

    /// The entry for `email`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn lookup(&self, email: &Email) -> Result<Option<RosterEntry>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|entry| &entry.email == email))
    }

    /// The role the roster grants `email` right now.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn role_for(&self, email: &Email) -> Result<Role, StoreError> {
        Ok(self
            .lookup(email)?
            .map_or(Role::User, |entry| entry.granted_role()))
    }

    /// The role a session really has, ignoring whatever it caches.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn effective_role(&self, session: &UserSession) -> Result<Role, StoreError> {
        if !session.signed_in {
            return Ok(Role::User);
        }
        let role = self.role_for(&session.email)?;
        if role != session.cached_role() {
            tracing::debug!(
                email = %session.email,
                cached = %session.cached_role(),
                effective = %role,
                "Session role differs from roster"
            );
        }
        Ok(role)
    }

    /// Add an entry or replace the role of an existing one.
    ///
    /// An upserted entry is always active.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    #[instrument(skip(self, email), fields(email = %email))]
    pub fn upsert(&self, email: Email, role: Role) -> Result<RosterEntry, StoreError> {
        let entry = self.storage.update(keys::ADMIN_ROSTER, |entries| {
            let entry = RosterEntry {
                email: email.clone(),
                role,
                status: RosterStatus::Active,
            };
            match entries.iter_mut().find(|existing| existing.email == email) {
                Some(existing) => *existing = entry.clone(),
                None => entries.push(entry.clone()),
            }
            entry
        })?;
        tracing::info!(role = %entry.role, "Roster entry saved");
        Ok(entry)
    }

    /// Activate or deactivate an entry.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::NotFound` if `email` is not on the roster.
    #[instrument(skip(self, email), fields(email = %email))]
    pub fn set_status(
        &self,
        email: &Email,
        status: RosterStatus,
    ) -> Result<RosterEntry, RosterError> {
        self.storage.try_update(keys::ADMIN_ROSTER, |entries| {
            let entry = entries
                .iter_mut()
                .find(|entry| &entry.email == email)
                .ok_or_else(|| RosterError::NotFound(email.clone()))?;
            entry.status = status;
            Ok(entry.clone())
        })
    }

    /// Remove an entry.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::NotFound` if `email` is not on the roster.
    #[instrument(skip(self, email), fields(email = %email))]
    pub fn remove(&self, email: &Email) -> Result<(), RosterError> {
        self.storage.try_update(keys::ADMIN_ROSTER, |entries| {
            let before = entries.len();
            entries.retain(|entry| &entry.email != email);
            if entries.len() == before {
                return Err(RosterError::NotFound(email.clone()));
            }
            Ok(())
        })
    }
}

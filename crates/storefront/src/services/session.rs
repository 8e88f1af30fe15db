//! Mock sign-in and profile edits.
//!
//! There is no authentication: signing in just stores a session document
//! under the `user` key. The role copied onto it is a display cache; see
//! [`RosterService::effective_role`](super::RosterService::effective_role).

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use soundsync_core::{Email, EmailError};

use crate::events::Signal;
use crate::models::UserSession;
use crate::models::session::default_avatar_url;
use crate::services::{RosterService, missing_fields_message};
use crate::store::{Storage, StoreError, keys};

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    InvalidEmail(#[from] EmailError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sign-in form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Profile edit form; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Service for the profile's signed-in user.
pub struct SessionService<'a> {
    storage: &'a Storage,
}

impl<'a> SessionService<'a> {
    /// Create a new session service.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The signed-in session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn current(&self) -> Result<Option<UserSession>, StoreError> {
        Ok(self
            .storage
            .read(keys::USER)?
            .filter(|session| session.signed_in))
    }

    /// The signed-in session, or `SessionError::NotSignedIn`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSignedIn` when nobody is signed in.
    pub fn require(&self) -> Result<UserSession, SessionError> {
        self.current()?.ok_or(SessionError::NotSignedIn)
    }

    /// Sign in as `form.email`.
    ///
    /// A seller application already stored for the same email survives the
    /// sign-in; the cart is untouched either way.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Validation` for a blank name and
    /// `SessionError::InvalidEmail` for a malformed email.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub fn sign_in(&self, form: SignInForm) -> Result<UserSession, SessionError> {
        let name = form.name.trim().to_owned();
        if name.is_empty() {
            return Err(SessionError::Validation(missing_fields_message(&["name"])));
        }
        let email = Email::parse(&form.email)?;
        let role = RosterService::new(self.storage).role_for(&email)?;
        let avatar_url = form
            .avatar_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| default_avatar_url(&name));

        let session = self.storage.update(keys::USER, |stored| {
            let seller = stored
                .take()
                .filter(|previous| previous.email == email)
                .and_then(|previous| previous.seller);
            let session = UserSession {
                signed_in: true,
                name,
                email,
                avatar_url: Some(avatar_url),
                role: Some(role),
                seller,
            };
            *stored = Some(session.clone());
            session
        })?;

        tracing::info!(role = %role, "Signed in");
        self.changed();
        Ok(session)
    }

    /// Sign out. The cart stays in the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    #[instrument(skip(self))]
    pub fn sign_out(&self) -> Result<(), StoreError> {
        self.storage.remove(keys::USER)?;
        tracing::info!("Signed out");
        self.changed();
        Ok(())
    }

    /// Change the display name or avatar.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSignedIn` when nobody is signed in and
    /// `SessionError::Validation` for a blank name.
    #[instrument(skip(self, form))]
    pub fn update_profile(&self, form: ProfileForm) -> Result<UserSession, SessionError> {
        if form.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(SessionError::Validation(missing_fields_message(&["name"])));
        }

        let session = self.storage.try_update(keys::USER, |stored| {
            let session = stored
                .as_mut()
                .filter(|session| session.signed_in)
                .ok_or(SessionError::NotSignedIn)?;
            if let Some(name) = form.name {
                session.name = name.trim().to_owned();
            }
            if let Some(url) = form.avatar_url {
                session.avatar_url = Some(url).filter(|url| !url.trim().is_empty());
            }
            Ok::<_, SessionError>(session.clone())
        })?;

        self.changed();
        Ok(session)
    }

    fn changed(&self) {
        self.storage.events().emit(Signal::UserUpdated);
    }
}

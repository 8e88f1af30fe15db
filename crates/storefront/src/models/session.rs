//! Signed-in session stored under the `user` key.

use serde::{Deserialize, Serialize};

use soundsync_core::{Email, Role};

use super::seller::SellerApplication;

/// The profile's current user.
///
/// Sign-in is mocked: nothing here is authenticated, and anyone able to edit
/// storage can change it. The cached `role` is for display only; access
/// checks go through the admin roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    #[serde(default)]
    pub signed_in: bool,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<SellerApplication>,
}

impl UserSession {
    /// Role cached on the session; absent means [`Role::User`].
    #[must_use]
    pub fn cached_role(&self) -> Role {
        self.role.unwrap_or_default()
    }

    /// Avatar to display, falling back to a generated initials image.
    #[must_use]
    pub fn avatar(&self) -> String {
        self.avatar_url
            .clone()
            .unwrap_or_else(|| default_avatar_url(&self.name))
    }
}

/// Generated avatar URL for a display name.
#[must_use]
pub fn default_avatar_url(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    let seed = if initials.is_empty() { "SS" } else { &initials };
    format!("https://ui-avatars.com/api/?name={seed}&background=random")
}

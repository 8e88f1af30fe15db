//! Admin roster entries.

use serde::{Deserialize, Serialize};

use soundsync_core::{Email, Role, RosterStatus};

/// Access grant for the admin console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub email: Email,
    pub role: Role,
    #[serde(default)]
    pub status: RosterStatus,
}

impl RosterEntry {
    /// The role this entry grants right now.
    ///
    /// An inactive entry grants nothing beyond a regular user.
    #[must_use]
    pub fn granted_role(&self) -> Role {
        match self.status {
            RosterStatus::Active => self.role,
            RosterStatus::Inactive => Role::User,
        }
    }
}

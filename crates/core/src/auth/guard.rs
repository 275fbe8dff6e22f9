//! Access checks for screens that need a logged-in user

use super::{AuthService, SessionPhase};
use crate::error::{Error, Result};
use crate::models::UserProfile;

/// Outcome of checking a protected screen
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    /// Session restore has not finished; show a placeholder
    Pending,
    /// Nobody is logged in; send the user to the landing page
    Deny,
    /// Render the screen for this user
    Allow(UserProfile),
}

impl AuthService {
    /// Non-blocking check, suitable for a render pass
    pub fn access(&self) -> Access {
        if self.phase() == SessionPhase::Pending {
            return Access::Pending;
        }
        match self.current_user() {
            Some(user) => Access::Allow(user),
            None => Access::Deny,
        }
    }

    /// Wait for session restore, then demand a logged-in user
    pub async fn require_user(&self) -> Result<UserProfile> {
        self.ready().await;
        self.current_user().ok_or(Error::NotAuthenticated)
    }
}

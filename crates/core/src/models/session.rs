//! Session record

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Persisted proof of a successful login.
///
/// Carries no expiry or signature; it is trusted as long as the email still
/// resolves to a stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Session {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

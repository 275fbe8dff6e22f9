//! API client error types

/// API result type
pub type Result<T> = std::result::Result<T, Error>;

/// Message used when the server gives no usable error body
pub const FALLBACK_MESSAGE: &str = "API request failed";

/// API client errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status; `message` is the server's or the fallback
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Token storage error: {0}")]
    Storage(#[from] classmatch_core::Error),
}

//! ClassMatch API Client
//!
//! Typed access to the ClassMatch REST backend.
//!
//! # Usage
//!
//! ```ignore
//! let client = ApiClient::new("http://localhost:5000/api", store);
//! let me = client.login("jane.smith@vanderbilt.edu", "password123").await?;
//! let matches = client.matches(&Filters::new()).await?;
//! ```
//!
//! Every call sends `Content-Type: application/json` and, once a token has
//! been stored under `auth_token`, `Authorization: Bearer <token>`.
//! Non-success responses become [`Error::Api`] carrying the server's
//! `message`.

mod auth;
pub mod client;
mod courses;
pub mod error;
mod groups;
mod messages;
pub mod protocol;

pub use client::{ApiClient, Filters};
pub use error::{Error, Result};
pub use protocol::{
    AuthResponse, ChatMessage, Conversation, Course, GroupUpdate, NewStudyGroup, StudentMatch,
    StudyGroup,
};

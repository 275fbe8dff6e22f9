//! ClassMatch Core Library
//!
//! Models, local persistence, password hashing and session state for the
//! ClassMatch client.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod seed;
pub mod storage;

pub use auth::{Access, AuthService, SessionPhase};
pub use config::Config;
pub use error::{Error, Result};
pub use models::*;
pub use password::{Argon2Config, Argon2Scheme, PasswordScheme};
pub use storage::{
    Database, KeyValueStore, MemoryStore, StoredUserRepository, UserRepository, AUTH_TOKEN_KEY,
    SESSION_KEY, USERS_KEY,
};

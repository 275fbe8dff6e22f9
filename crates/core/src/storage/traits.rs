//! Storage traits
//!
//! These traits define the storage interface, allowing for different
//! implementations (SQLite, in-memory, future network backend).

use crate::error::Result;
use crate::models::User;

/// String key-value persistence, the local equivalent of browser storage.
///
/// Values are opaque strings; callers decide the encoding (JSON for
/// records, raw text for tokens).
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// User account operations
pub trait UserRepository: Send + Sync {
    /// Find a user by exact email
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Insert a new user, returning the stored record (its id may be adjusted)
    fn insert(&self, user: User) -> Result<User>;

    /// Replace the stored record with the same email.
    ///
    /// Returns `false` when no such record exists.
    fn update(&self, user: &User) -> Result<bool>;

    /// All stored users
    fn list(&self) -> Result<Vec<User>>;
}

//! Persistence layer for ClassMatch
//!
//! Everything the client remembers lives in a string key-value store, the
//! same shape as browser local storage. [`Database`] backs it with SQLite;
//! [`MemoryStore`] keeps it in process memory.

mod memory;
mod migrations;
mod traits;
mod users;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, instrument};

use crate::error::Result;

pub use memory::MemoryStore;
pub use traits::{KeyValueStore, UserRepository};
pub use users::StoredUserRepository;

/// Key holding the current [`Session`](crate::models::Session) as JSON
pub const SESSION_KEY: &str = "classmatch_session";

/// Key holding the JSON list of stored users
pub const USERS_KEY: &str = "classmatch_users";

/// Key holding the raw bearer token for the backend API
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Main database handle
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Initialize database schema via migrations
    fn init(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn()
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // rusqlite leaves the connection usable after a panicking holder
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for Database {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove(&self, key: &str) -> Result<()> {
        let removed = self
            .conn()
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        debug!(removed, "Key removed");
        Ok(())
    }
}

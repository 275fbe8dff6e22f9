//! User repository over a key-value store
//!
//! All users, seeded or signed up, live in one JSON list under
//! [`USERS_KEY`](super::USERS_KEY).

use std::sync::{Arc, Mutex};

use tracing::{debug, info, instrument};

use super::traits::{KeyValueStore, UserRepository};
use super::USERS_KEY;
use crate::error::{Error, Result};
use crate::models::User;

pub struct StoredUserRepository {
    store: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl StoredUserRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Insert every user whose email is not stored yet. Returns how many were added.
    #[instrument(skip(self, users), fields(candidates = users.len()))]
    pub fn seed(&self, users: Vec<User>) -> Result<usize> {
        let _guard = self.lock();
        let mut stored = self.load()?;
        let mut added = 0;

        for user in users {
            if stored.iter().any(|u| u.email == user.email) {
                continue;
            }
            let user = with_unique_id(user, &stored);
            stored.push(user);
            added += 1;
        }

        if added > 0 {
            self.save(&stored)?;
            info!(added, "Seeded users");
        }
        Ok(added)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load(&self) -> Result<Vec<User>> {
        match self.store.get(USERS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, users: &[User]) -> Result<()> {
        let raw = serde_json::to_string(users)?;
        self.store.set(USERS_KEY, &raw)
    }
}

/// Ids come from the creation clock; bump past the newest stored id on collision.
fn with_unique_id(mut user: User, stored: &[User]) -> User {
    if let Some(max) = stored.iter().map(|u| u.id).max() {
        if user.id <= max && stored.iter().any(|u| u.id == user.id) {
            user.id = max + 1;
        }
    }
    user
}

impl UserRepository for StoredUserRepository {
    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.load()?.into_iter().find(|u| u.email == email))
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    fn insert(&self, user: User) -> Result<User> {
        let _guard = self.lock();
        let mut stored = self.load()?;

        if stored.iter().any(|u| u.email == user.email) {
            return Err(Error::EmailTaken);
        }

        let user = with_unique_id(user, &stored);
        stored.push(user.clone());
        self.save(&stored)?;

        debug!(id = user.id, "User inserted");
        Ok(user)
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    fn update(&self, user: &User) -> Result<bool> {
        let _guard = self.lock();
        let mut stored = self.load()?;

        let Some(slot) = stored.iter_mut().find(|u| u.email == user.email) else {
            return Ok(false);
        };
        *slot = user.clone();
        self.save(&stored)?;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<User>> {
        self.load()
    }
}

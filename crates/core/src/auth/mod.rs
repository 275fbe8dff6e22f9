//! Session and authentication state
//!
//! [`AuthService`] owns the current user and the persisted session record.
//! It is constructed explicitly and shared by whoever needs it; there is no
//! process-wide instance.
//!
//! # Lifecycle
//!
//! A new service starts in [`SessionPhase::Pending`]. Calling
//! [`AuthService::restore_session`] reads the stored session (if any) and
//! always finishes in [`SessionPhase::Ready`]. Consumers that must not act
//! before then await [`AuthService::ready`].

mod guard;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::{ProfileUpdate, Session, SignupRequest, User, UserProfile};
use crate::password::PasswordScheme;
use crate::storage::{KeyValueStore, UserRepository, SESSION_KEY};

pub use guard::Access;

/// Minimum accepted password length at signup
pub const MIN_PASSWORD_LEN: usize = 6;

/// Whether the stored session has been looked at yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Pending,
    Ready,
}

pub struct AuthService {
    store: Arc<dyn KeyValueStore>,
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordScheme>,
    current: RwLock<Option<User>>,
    phase: watch::Sender<SessionPhase>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordScheme>,
    ) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Pending);
        Self {
            store,
            users,
            passwords,
            current: RwLock::new(None),
            phase,
        }
    }

    /// Load the persisted session and mark the service ready.
    ///
    /// A corrupt record is deleted; a session for an unknown email is
    /// ignored. Neither is an error. The phase becomes `Ready` even when the
    /// store itself fails.
    #[instrument(skip(self))]
    pub async fn restore_session(&self) -> Result<Option<UserProfile>> {
        let store = Arc::clone(&self.store);
        let users = Arc::clone(&self.users);

        let loaded = tokio::task::spawn_blocking(move || {
            load_session_user(store.as_ref(), users.as_ref())
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))
        .and_then(|r| r);

        let result = loaded.map(|found| {
            found.map(|user| {
                info!(email = %user.email, "Session restored");
                let profile = user.profile();
                *self.current_mut() = Some(user);
                profile
            })
        });

        self.phase.send_replace(SessionPhase::Ready);
        result
    }

    /// Resolves once [`restore_session`](Self::restore_session) has finished
    pub async fn ready(&self) {
        let mut rx = self.phase.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|phase| *phase == SessionPhase::Ready).await;
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    /// Log in with an email and password
    #[instrument(skip(self, password))]
    pub fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let user = self
            .users
            .find_by_email(email)?
            .ok_or(Error::InvalidCredentials)?;

        if !self.passwords.verify(password, &user.password_hash)? {
            return Err(Error::InvalidCredentials);
        }

        self.start_session(&user.email)?;

        let profile = user.profile();
        *self.current_mut() = Some(user);
        info!("User logged in");
        Ok(profile)
    }

    /// Create an account and log into it
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub fn signup(&self, request: SignupRequest) -> Result<UserProfile> {
        if self.users.find_by_email(&request.email)?.is_some() {
            return Err(Error::EmailTaken);
        }
        validate_signup(&request)?;

        let password_hash = self.passwords.hash(&request.password)?;
        let mut user = User::new(request.email, request.name, password_hash);
        user.major = request.major;
        user.year = request.year;
        user.bio = request.bio;

        let user = self.users.insert(user)?;
        self.start_session(&user.email)?;

        let profile = user.profile();
        *self.current_mut() = Some(user);
        info!(id = profile.id, "User signed up");
        Ok(profile)
    }

    /// Forget the current user and delete the stored session
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        *self.current_mut() = None;
        self.store.remove(SESSION_KEY)?;
        info!("User logged out");
        Ok(())
    }

    /// Merge `updates` into the current user.
    ///
    /// The stored record is rewritten when the repository still holds the
    /// user's email; otherwise only the in-memory copy changes.
    #[instrument(skip(self, updates))]
    pub fn update_profile(&self, updates: ProfileUpdate) -> Result<UserProfile> {
        let mut current = self.current_mut();
        let mut user = current.as_ref().cloned().ok_or(Error::NotAuthenticated)?;

        user.apply(updates);

        if !self.users.update(&user)? {
            debug!(email = %user.email, "User not in repository, update kept in memory only");
        }

        let profile = user.profile();
        *current = Some(user);
        Ok(profile)
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.current().as_ref().map(User::profile)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    fn start_session(&self, email: &str) -> Result<()> {
        let session = Session::new(email);
        let raw = serde_json::to_string(&session)?;
        self.store.set(SESSION_KEY, &raw)
    }

    fn current(&self) -> RwLockReadGuard<'_, Option<User>> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn current_mut(&self) -> RwLockWriteGuard<'_, Option<User>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn load_session_user(
    store: &dyn KeyValueStore,
    users: &dyn UserRepository,
) -> Result<Option<User>> {
    let Some(raw) = store.get(SESSION_KEY)? else {
        return Ok(None);
    };

    let session: Session = match serde_json::from_str(&raw) {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Error loading session, discarding it");
            store.remove(SESSION_KEY)?;
            return Ok(None);
        }
    };

    let user = match users.find_by_email(&session.email) {
        Ok(user) => user,
        Err(Error::Serialization(e)) => {
            warn!(error = %e, "Stored user list is unreadable, staying logged out");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    if user.is_none() {
        debug!(email = %session.email, "Session refers to an unknown user");
    }
    Ok(user)
}

fn validate_signup(request: &SignupRequest) -> Result<()> {
    if !request.email.contains('@') {
        return Err(Error::Validation("Email address is invalid".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(Error::Validation("Name is required".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudyPreferences;
    use crate::password::test_scheme;
    use crate::seed::{sample_users, SAMPLE_PASSWORD};
    use crate::storage::{MemoryStore, StoredUserRepository};

    const SEED_EMAIL: &str = "john.doe@vanderbilt.edu";

    struct Fixture {
        store: Arc<MemoryStore>,
        users: Arc<StoredUserRepository>,
        auth: AuthService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let scheme = Arc::new(test_scheme());
        let users = Arc::new(StoredUserRepository::new(store.clone()));
        users.seed(sample_users(scheme.as_ref()).unwrap()).unwrap();
        let auth = AuthService::new(store.clone(), users.clone(), scheme);
        Fixture { store, users, auth }
    }

    #[test]
    fn test_login_with_seed_credentials() {
        let f = fixture();
        let user = f.auth.login(SEED_EMAIL, SAMPLE_PASSWORD).unwrap();

        assert_eq!(user.email, SEED_EMAIL);
        assert!(f.auth.is_authenticated());
        assert_eq!(f.auth.current_user().unwrap().email, SEED_EMAIL);

        let raw = f.store.get(SESSION_KEY).unwrap().unwrap();
        let session: Session = serde_json::from_str(&raw).unwrap();
        assert_eq!(session.email, SEED_EMAIL);
    }

    #[test]
    fn test_login_wrong_password() {
        let f = fixture();
        let err = f.auth.login(SEED_EMAIL, "not-the-password").unwrap_err();

        assert!(matches!(err, Error::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!f.auth.is_authenticated());
        assert!(f.store.get(SESSION_KEY).unwrap().is_none());
    }

    #[test]
    fn test_login_unknown_email() {
        let f = fixture();
        let err = f.auth.login("nobody@vanderbilt.edu", SAMPLE_PASSWORD).unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[test]
    fn test_signup_with_seed_email_fails() {
        let f = fixture();
        // Otherwise-invalid fields must not mask the collision
        let err = f.auth.signup(SignupRequest::new(SEED_EMAIL, "x", "")).unwrap_err();

        assert!(matches!(err, Error::EmailTaken));
        assert_eq!(err.to_string(), "Email already exists");
        assert!(!f.auth.is_authenticated());
    }

    #[test]
    fn test_signup_creates_user_and_session() {
        let f = fixture();
        let user = f
            .auth
            .signup(SignupRequest::new("ada@uni.edu", "engines!", "Ada Lovelace"))
            .unwrap();

        assert_eq!(user.avatar, "AL");
        assert!(user.enrolled_courses.is_empty());
        assert_eq!(user.study_preferences, StudyPreferences::default());
        assert!(f.auth.is_authenticated());

        let raw = f.store.get(SESSION_KEY).unwrap().unwrap();
        let session: Session = serde_json::from_str(&raw).unwrap();
        assert_eq!(session.email, "ada@uni.edu");

        let stored = f.users.find_by_email("ada@uni.edu").unwrap().unwrap();
        assert_ne!(stored.password_hash, "engines!");
    }

    #[test]
    fn test_signup_then_login_again() {
        let f = fixture();
        f.auth
            .signup(SignupRequest::new("ada@uni.edu", "engines!", "Ada Lovelace"))
            .unwrap();
        f.auth.logout().unwrap();

        f.auth.login("ada@uni.edu", "engines!").unwrap();
        assert!(f.auth.is_authenticated());

        let err = f
            .auth
            .signup(SignupRequest::new("ada@uni.edu", "another", "Ada Again"))
            .unwrap_err();
        assert!(matches!(err, Error::EmailTaken));
    }

    #[test]
    fn test_signup_validation() {
        let f = fixture();

        let err = f
            .auth
            .signup(SignupRequest::new("no-at-sign", "longenough", "Name"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = f
            .auth
            .signup(SignupRequest::new("a@uni.edu", "short", "Name"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = f
            .auth
            .signup(SignupRequest::new("a@uni.edu", "longenough", "   "))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert!(f.users.find_by_email("a@uni.edu").unwrap().is_none());
    }

    #[test]
    fn test_logout_clears_session() {
        let f = fixture();
        f.auth.login(SEED_EMAIL, SAMPLE_PASSWORD).unwrap();

        f.auth.logout().unwrap();

        assert!(!f.auth.is_authenticated());
        assert!(f.auth.current_user().is_none());
        assert!(f.store.get(SESSION_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_known_session() {
        let f = fixture();
        let session = serde_json::to_string(&Session::new(SEED_EMAIL)).unwrap();
        f.store.set(SESSION_KEY, &session).unwrap();

        assert_eq!(f.auth.phase(), SessionPhase::Pending);
        let restored = f.auth.restore_session().await.unwrap();

        assert_eq!(restored.unwrap().email, SEED_EMAIL);
        assert!(f.auth.is_authenticated());
        assert_eq!(f.auth.phase(), SessionPhase::Ready);
    }

    #[tokio::test]
    async fn test_restore_unknown_email() {
        let f = fixture();
        let session = serde_json::to_string(&Session::new("ghost@uni.edu")).unwrap();
        f.store.set(SESSION_KEY, &session).unwrap();

        let restored = f.auth.restore_session().await.unwrap();

        assert!(restored.is_none());
        assert!(!f.auth.is_authenticated());
        assert_eq!(f.auth.phase(), SessionPhase::Ready);
    }

    #[tokio::test]
    async fn test_restore_corrupt_session() {
        let f = fixture();
        f.store.set(SESSION_KEY, "{not json").unwrap();

        let restored = f.auth.restore_session().await.unwrap();

        assert!(restored.is_none());
        assert!(!f.auth.is_authenticated());
        assert!(f.store.get(SESSION_KEY).unwrap().is_none());
        assert_eq!(f.auth.phase(), SessionPhase::Ready);
    }

    #[tokio::test]
    async fn test_restore_wrong_shape_session() {
        let f = fixture();
        f.store.set(SESSION_KEY, r#"{"email":5}"#).unwrap();

        let restored = f.auth.restore_session().await.unwrap();

        assert!(restored.is_none());
        assert!(f.store.get(SESSION_KEY).unwrap().is_none());
        assert_eq!(f.auth.phase(), SessionPhase::Ready);
    }

    #[tokio::test]
    async fn test_restore_with_unreadable_user_list() {
        let f = fixture();
        let session = serde_json::to_string(&Session::new(SEED_EMAIL)).unwrap();
        f.store.set(SESSION_KEY, &session).unwrap();
        f.store.set(crate::storage::USERS_KEY, "{garbage").unwrap();

        let restored = f.auth.restore_session().await.unwrap();

        assert!(restored.is_none());
        assert!(!f.auth.is_authenticated());
        assert_eq!(f.auth.phase(), SessionPhase::Ready);

        f.auth.logout().unwrap();
        assert!(f.store.get(SESSION_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_without_session() {
        let f = fixture();
        assert!(f.auth.restore_session().await.unwrap().is_none());
        assert_eq!(f.auth.phase(), SessionPhase::Ready);
    }

    #[tokio::test]
    async fn test_ready_waits_for_restore() {
        let f = Arc::new(fixture());

        let waiter = {
            let f = Arc::clone(&f);
            tokio::spawn(async move {
                f.auth.ready().await;
                f.auth.phase()
            })
        };

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        f.auth.restore_session().await.unwrap();
        assert_eq!(waiter.await.unwrap(), SessionPhase::Ready);
    }

    #[test]
    fn test_update_profile_merges_and_persists() {
        let f = fixture();
        f.auth.login(SEED_EMAIL, SAMPLE_PASSWORD).unwrap();
        let before = f.auth.current_user().unwrap();

        let updated = f
            .auth
            .update_profile(ProfileUpdate {
                bio: Some("Night owl".into()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(updated.bio.as_deref(), Some("Night owl"));
        assert_eq!(updated.name, before.name);
        assert_eq!(updated.enrolled_courses, before.enrolled_courses);
        assert_eq!(updated.study_preferences, before.study_preferences);

        let stored = f.users.find_by_email(SEED_EMAIL).unwrap().unwrap();
        assert_eq!(stored.bio.as_deref(), Some("Night owl"));
        assert_eq!(stored.name, before.name);
    }

    #[tokio::test]
    async fn test_update_profile_for_user_missing_from_repository() {
        let store = Arc::new(MemoryStore::new());
        let scheme = Arc::new(test_scheme());
        let users = Arc::new(StoredUserRepository::new(store.clone()));
        users.seed(sample_users(scheme.as_ref()).unwrap()).unwrap();

        let auth = AuthService::new(store.clone(), users.clone(), scheme);
        let session = serde_json::to_string(&Session::new(SEED_EMAIL)).unwrap();
        store.set(SESSION_KEY, &session).unwrap();
        auth.restore_session().await.unwrap();

        // Another writer wipes the user list behind our back
        store.set(crate::storage::USERS_KEY, "[]").unwrap();

        let updated = auth
            .update_profile(ProfileUpdate {
                name: Some("Johnny Doe".into()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(updated.name, "Johnny Doe");
        assert_eq!(auth.current_user().unwrap().name, "Johnny Doe");
        assert!(users.list().unwrap().is_empty());
    }

    /// Accepts everything except writes to the user list
    struct FailingUserWrites(MemoryStore);

    impl KeyValueStore for FailingUserWrites {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if key == crate::storage::USERS_KEY {
                return Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")));
            }
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.0.remove(key)
        }
    }

    #[test]
    fn test_update_profile_failed_write_keeps_memory_unchanged() {
        let scheme = Arc::new(test_scheme());
        let seed_store = MemoryStore::new();
        let seeded = sample_users(scheme.as_ref()).unwrap();
        seed_store
            .set(crate::storage::USERS_KEY, &serde_json::to_string(&seeded).unwrap())
            .unwrap();

        let store = Arc::new(FailingUserWrites(seed_store));
        let users = Arc::new(StoredUserRepository::new(store.clone()));
        let auth = AuthService::new(store, users.clone(), scheme);
        auth.login(SEED_EMAIL, SAMPLE_PASSWORD).unwrap();

        let err = auth
            .update_profile(ProfileUpdate {
                name: Some("Johnny Doe".into()),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert_eq!(auth.current_user().unwrap().name, "John Doe");
        assert_eq!(users.find_by_email(SEED_EMAIL).unwrap().unwrap().name, "John Doe");
    }

    #[test]
    fn test_update_profile_requires_login() {
        let f = fixture();
        let err = f.auth.update_profile(ProfileUpdate::default()).unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
    }
}

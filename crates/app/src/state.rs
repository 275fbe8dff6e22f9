//! Application state management

use std::path::{Path, PathBuf};
use std::sync::Arc;

use classmatch_api::ApiClient;
use classmatch_core::seed::seed_sample_users;
use classmatch_core::{
    Argon2Scheme, AuthService, Config, Database, KeyValueStore, PasswordScheme,
    StoredUserRepository,
};
use tracing::{info, warn};

use crate::error::Result;

/// Everything a command needs, wired once at start-up
pub struct AppState {
    pub config: Config,
    pub auth: Arc<AuthService>,
    pub api: ApiClient,
    data_dir: PathBuf,
}

impl AppState {
    /// Open the on-disk store under the configured data directory
    pub fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        std::fs::create_dir_all(&data_dir).map_err(classmatch_core::Error::from)?;

        let db = Database::open(data_dir.join("classmatch.db"))?;
        Self::with_store(config, Arc::new(db), data_dir)
    }

    pub fn with_store(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        data_dir: PathBuf,
    ) -> Result<Self> {
        let passwords: Arc<dyn PasswordScheme> = Arc::new(Argon2Scheme::new(config.argon2)?);
        let users = Arc::new(StoredUserRepository::new(Arc::clone(&store)));

        if config.seed_sample_users {
            match seed_sample_users(&users, passwords.as_ref()) {
                Ok(0) => {}
                Ok(added) => info!(added, "Sample students added"),
                Err(e) => warn!(error = %e, "Skipping sample students"),
            }
        }

        let auth = Arc::new(AuthService::new(
            Arc::clone(&store),
            users,
            passwords,
        ));
        let api = ApiClient::new(&config.api_base_url, store);

        Ok(Self {
            config,
            auth,
            api,
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

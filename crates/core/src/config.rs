//! Client configuration
//!
//! Loaded from `config.toml` in the platform config directory. Every field
//! has a default, so a missing file means "use the defaults".

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::password::Argon2Config;

/// Backend used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "CLASSMATCH_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST backend, including the `/api` prefix
    pub api_base_url: String,
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Insert the bundled sample students on start-up
    pub seed_sample_users: bool,
    pub argon2: Argon2Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_dir: None,
            log_filter: "warn".to_string(),
            seed_sample_users: true,
            argon2: Argon2Config::default(),
        }
    }
}

impl Config {
    /// Load from the platform config directory, then apply env overrides
    pub fn load() -> Result<Self> {
        let path = project_dirs()?.config_dir().join("config.toml");
        Ok(Self::load_from(&path)?.with_env_overrides())
    }

    /// Apply `CLASSMATCH_API_URL` when set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            self.api_base_url = url;
        }
        self
    }

    /// Load from an explicit file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Directory holding the local database
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "classmatch", "classmatch").ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine data directory",
        ))
    })
}

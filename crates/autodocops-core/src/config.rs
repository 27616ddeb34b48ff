//! Storage configuration.
//!
//! Resolved once at start-up and handed to [`crate::storage::Backends`].
//!
//! | Variable                      | Default                 |
//! |-------------------------------|-------------------------|
//! | `AUTODOCOPS_STORAGE`          | `secure`                |
//! | `AUTODOCOPS_DATA_DIR`         | `~/.config/autodocops`  |
//! | `AUTODOCOPS_KEYRING_SERVICE`  | `autodocops`            |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::paths;

pub const ENV_STORAGE: &str = "AUTODOCOPS_STORAGE";
pub const ENV_DATA_DIR: &str = "AUTODOCOPS_DATA_DIR";
pub const ENV_KEYRING_SERVICE: &str = "AUTODOCOPS_KEYRING_SERVICE";

pub const DEFAULT_KEYRING_SERVICE: &str = "autodocops";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown storage mode '{0}' (expected secure, plain or browser)")]
    InvalidMode(String),

    #[error("Cannot determine data directory: {0}")]
    NoDataDir(String),
}

/// Which storage medium the host offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageMode {
    /// OS credential store for the session, plain files as fallback.
    #[default]
    Secure,
    /// Plain files only.
    Plain,
    /// Browser-style local storage.
    Browser,
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "secure" => Ok(StorageMode::Secure),
            "plain" => Ok(StorageMode::Plain),
            "browser" | "web" => Ok(StorageMode::Browser),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageMode::Secure => "secure",
            StorageMode::Plain => "plain",
            StorageMode::Browser => "browser",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub mode: StorageMode,
    pub data_dir: PathBuf,
    pub keyring_service: String,
}

impl StorageConfig {
    /// Secure mode rooted at `data_dir`.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            mode: StorageMode::default(),
            data_dir,
            keyring_service: DEFAULT_KEYRING_SERVICE.to_string(),
        }
    }

    pub fn with_mode(mut self, mode: StorageMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_keyring_service(mut self, service: impl Into<String>) -> Self {
        self.keyring_service = service.into();
        self
    }

    /// Build from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mode = match get(ENV_STORAGE) {
            Some(value) => value.parse()?,
            None => StorageMode::default(),
        };

        let data_dir = match get(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => paths::default_data_dir().map_err(ConfigError::NoDataDir)?,
        };

        let keyring_service =
            get(ENV_KEYRING_SERVICE).unwrap_or_else(|| DEFAULT_KEYRING_SERVICE.to_string());

        Ok(Self {
            mode,
            data_dir,
            keyring_service,
        })
    }
}

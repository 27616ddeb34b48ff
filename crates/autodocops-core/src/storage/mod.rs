//! Persistence adapter: named string values in a host storage medium.
//!
//! # Overview
//!
//! Every store persists its record through a [`StorageBackend`]. The backend
//! only moves strings; serialization belongs to [`crate::persist`].
//!
//! - **Keyring** - OS credential store (macOS Keychain, Windows Credential
//!   Manager, Linux Secret Service)
//! - **File** - plain, unencrypted one-file-per-key directory
//! - **Local storage** - browser-style single map file, synchronous underneath
//! - **Fallback** - tries a primary backend, then a secondary one, on every call
//! - **Lenient** - logs and swallows backend errors
//!
//! # Backend Selection
//!
//! The [`StorageMode`] from configuration is resolved once, in
//! [`Backends::from_config`]:
//!
//! ```text
//! mode      session store              preference store
//! secure    Fallback(Keyring -> File)  Lenient(File)
//! plain     File                       Lenient(File)
//! browser   LocalStorage               LocalStorage
//! ```
//!
//! # Contract
//!
//! `get` on a key that was never set returns `Ok(None)`. `remove` on a
//! missing key is `Ok(())`. Nothing confirms physical durability.

pub mod fallback;
pub mod file;
pub mod lenient;
pub mod local;
pub mod memory;
pub mod secure;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StorageConfig, StorageMode};

pub use self::fallback::FallbackBackend;
pub use self::file::FileBackend;
pub use self::lenient::LenientBackend;
pub use self::local::LocalStorageBackend;
pub use self::memory::MemoryBackend;
pub use self::secure::KeyringBackend;

/// Errors raised by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Secure store error: {0}")]
    Secure(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A durable key-value medium holding string values.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short label used in log lines.
    fn name(&self) -> &'static str;

    /// Read a value. Missing keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Missing keys are not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to a backend.
pub type SharedBackend = Arc<dyn StorageBackend>;

/// The pair of backends used by the two stores.
#[derive(Clone)]
pub struct Backends {
    pub session: SharedBackend,
    pub preferences: SharedBackend,
}

impl Backends {
    /// Resolve the storage mode into concrete backends.
    pub fn from_config(config: &StorageConfig) -> Self {
        match config.mode {
            StorageMode::Secure => {
                let plain: SharedBackend = Arc::new(FileBackend::new(config.data_dir.clone()));
                let secure: SharedBackend =
                    Arc::new(KeyringBackend::new(config.keyring_service.clone()));
                Self {
                    session: Arc::new(FallbackBackend::new(secure, Arc::clone(&plain))),
                    preferences: Arc::new(LenientBackend::new(plain)),
                }
            }
            StorageMode::Plain => {
                let plain: SharedBackend = Arc::new(FileBackend::new(config.data_dir.clone()));
                Self {
                    session: Arc::clone(&plain),
                    preferences: Arc::new(LenientBackend::new(plain)),
                }
            }
            StorageMode::Browser => {
                // Both stores share one map file, so they must share one handle.
                let local: SharedBackend =
                    Arc::new(LocalStorageBackend::in_dir(&config.data_dir));
                Self {
                    session: Arc::clone(&local),
                    preferences: local,
                }
            }
        }
    }
}

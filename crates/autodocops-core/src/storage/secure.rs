//! OS credential store backend.
//!
//! Each key becomes one keyring entry under the configured service name
//! (`service = "autodocops"`, `user = <key>`). The platform store is picked by
//! the `keyring` crate: Keychain on macOS, Credential Manager on Windows, the
//! Secret Service (GNOME Keyring, KWallet) on Linux. Hosts without a Secret
//! Service fail here and the session falls back to plain files.
//!
//! Keyring calls can block on IPC, so they run on the blocking pool.

use async_trait::async_trait;
use keyring::Entry;

use super::{StorageBackend, StorageError};

/// Secure, OS-backed storage.
#[derive(Debug, Clone)]
pub struct KeyringBackend {
    service: String,
}

impl KeyringBackend {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    async fn with_entry<T, F>(&self, key: &str, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> Result<T, keyring::Error> + Send + 'static,
    {
        let service = self.service.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &key).map_err(secure_error)?;
            op(entry).map_err(secure_error)
        })
        .await
        .map_err(|e| StorageError::Secure(format!("keyring task failed: {e}")))?
    }
}

fn secure_error(e: keyring::Error) -> StorageError {
    StorageError::Secure(e.to_string())
}

#[async_trait]
impl StorageBackend for KeyringBackend {
    fn name(&self) -> &'static str {
        "keyring"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_entry(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let value = value.to_string();
        self.with_entry(key, move |entry| entry.set_password(&value))
            .await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_entry(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }
}

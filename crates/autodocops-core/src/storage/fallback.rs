//! Secure-first storage with a plain fallback.
//!
//! Every call goes to the primary backend first. If it fails for any reason
//! the same call is repeated on the fallback backend and its result is
//! returned. No mode is remembered between calls: a primary failure during
//! `set` does not stop the next `get` from trying the primary again.

use async_trait::async_trait;

use super::{SharedBackend, StorageBackend, StorageError};

/// Tries `primary`, then `fallback`, on each call.
pub struct FallbackBackend {
    primary: SharedBackend,
    fallback: SharedBackend,
}

impl FallbackBackend {
    pub fn new(primary: SharedBackend, fallback: SharedBackend) -> Self {
        Self { primary, fallback }
    }

    fn note_failure(&self, op: &str, key: &str, err: &StorageError) {
        log::warn!(
            "{} {op} failed for '{key}', falling back to {}: {err}",
            self.primary.name(),
            self.fallback.name()
        );
    }
}

#[async_trait]
impl StorageBackend for FallbackBackend {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.primary.get(key).await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.note_failure("get", key, &e);
                self.fallback.get(key).await
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self.primary.set(key, value).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.note_failure("set", key, &e);
                self.fallback.set(key, value).await
            }
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.primary.remove(key).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.note_failure("remove", key, &e);
                self.fallback.remove(key).await
            }
        }
    }
}

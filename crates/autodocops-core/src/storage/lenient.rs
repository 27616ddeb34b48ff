//! Error-swallowing wrapper for non-critical records.
//!
//! UI preferences are not worth failing over: a failed read is treated as
//! "nothing stored" and a failed write is dropped with a warning.

use async_trait::async_trait;

use super::{SharedBackend, StorageBackend, StorageError};

pub struct LenientBackend {
    inner: SharedBackend,
}

impl LenientBackend {
    pub fn new(inner: SharedBackend) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for LenientBackend {
    fn name(&self) -> &'static str {
        "lenient"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.inner.get(key).await {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!("Ignoring {} read failure for '{key}': {e}", self.inner.name());
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Err(e) = self.inner.set(key, value).await {
            log::warn!("Ignoring {} write failure for '{key}': {e}", self.inner.name());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        if let Err(e) = self.inner.remove(key).await {
            log::warn!("Ignoring {} remove failure for '{key}': {e}", self.inner.name());
        }
        Ok(())
    }
}

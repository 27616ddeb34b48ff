//! Plain key-value storage on disk.
//!
//! # File Format
//!
//! One file per key, holding the raw value, in the data directory:
//!
//! ```text
//! ~/.config/autodocops/
//! ├── autodocops-session     # {"user":...,"token":...,"isAuthenticated":true}
//! └── autodocops-ui          # {"theme":"dark","notifications":true}
//! ```
//!
//! Values are NOT encrypted. On Unix the files are created with mode `0600`.
//! This is the fallback medium when the OS credential store is unavailable.

use std::fs;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::{StorageBackend, StorageError};

/// Unencrypted one-file-per-key store.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`. The directory is created on first write.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory holding the value files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        // Leading dot keeps temp files out of the key namespace.
        self.dir.join(format!(".{key}.tmp"))
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let temp_path = self.temp_path_for(key);
        fs::write(&temp_path, value)?;
        restrict_permissions(&temp_path)?;

        // Atomic rename (on Unix, this is guaranteed atomic)
        fs::rename(&temp_path, &path)?;
        log::debug!("Wrote {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read(key)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write(key, value)
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.delete(key)
    }
}

/// Keys must be a single normal path component.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".to_string()));
    }

    let mut components = Path::new(key).components();
    match components.next() {
        Some(Component::Normal(_)) if components.next().is_none() && !key.starts_with('.') => {
            Ok(())
        }
        _ => Err(StorageError::InvalidKey(key.to_string())),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), StorageError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), StorageError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn set_then_get() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());

        backend.set("autodocops-ui", r#"{"theme":"dark"}"#).await.unwrap();
        let value = backend.get("autodocops-ui").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"theme":"dark"}"#));
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());
        assert!(backend.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let backend = FileBackend::new(nested.clone());

        backend.set("key", "value").await.unwrap();
        assert!(nested.join("key").exists());
    }

    #[tokio::test]
    async fn set_overwrites_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());

        backend.set("key", "first").await.unwrap();
        backend.set("key", "second").await.unwrap();

        assert_eq!(backend.get("key").await.unwrap().as_deref(), Some("second"));
        assert!(!dir.path().join(".key.tmp").exists());
    }

    #[tokio::test]
    async fn remove_deletes_file() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());

        backend.set("key", "value").await.unwrap();
        backend.remove("key").await.unwrap();
        assert!(backend.get("key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_missing_is_ok() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());
        backend.remove("never-set").await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());
        backend.set("token", "secret").await.unwrap();

        let mode = fs::metadata(dir.path().join("token"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    mod keys {
        use super::*;

        #[test]
        fn accepts_plain_names() {
            assert!(validate_key("autodocops-session").is_ok());
            assert!(validate_key("ui.prefs").is_ok());
        }

        #[test]
        fn rejects_empty() {
            assert!(matches!(validate_key(""), Err(StorageError::InvalidKey(_))));
        }

        #[test]
        fn rejects_traversal() {
            assert!(validate_key("..").is_err());
            assert!(validate_key("../escape").is_err());
            assert!(validate_key("a/b").is_err());
            assert!(validate_key("/abs").is_err());
        }

        #[test]
        fn rejects_hidden_names() {
            assert!(validate_key(".key.tmp").is_err());
        }

        #[tokio::test]
        async fn invalid_key_is_rejected_by_backend() {
            let dir = tempdir().unwrap();
            let backend = FileBackend::new(dir.path().to_path_buf());
            let err = backend.set("../x", "v").await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)));
        }
    }
}

//! Browser-style local storage.
//!
//! All keys live in one JSON object in a single file, the way a browser keeps
//! an origin's `localStorage`. Access is synchronous underneath and simply
//! exposed through the async [`StorageBackend`] contract.
//!
//! ```json
//! {
//!   "autodocops-session": "{\"user\":null,\"token\":null,\"isAuthenticated\":false}",
//!   "autodocops-ui": "{\"theme\":\"system\",\"notifications\":true}"
//! }
//! ```
//!
//! The map is loaded on first use and written through on every change. One
//! process should hold one handle per file; see [`super::Backends`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{StorageBackend, StorageError};

/// File name used by [`LocalStorageBackend::in_dir`].
pub const LOCAL_STORAGE_FILE: &str = "local_storage.json";

type Map = BTreeMap<String, String>;

pub struct LocalStorageBackend {
    path: PathBuf,
    cache: Mutex<Option<Map>>,
}

impl LocalStorageBackend {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cache: Mutex::new(None),
        }
    }

    /// Backend stored as `local_storage.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(LOCAL_STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Option<Map>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the loaded map, loading it from disk if needed.
    fn with_map<T>(&self, f: impl FnOnce(&mut Map) -> T) -> Result<T, StorageError> {
        let mut guard = self.lock();
        if guard.is_none() {
            *guard = Some(self.load()?);
        }
        match guard.as_mut() {
            Some(map) => Ok(f(map)),
            None => Err(StorageError::Unavailable(
                "local storage not loaded".to_string(),
            )),
        }
    }

    /// Read the map from disk. A file that does not parse is moved aside to
    /// `<file>.corrupt` and an empty map is used in its place.
    fn load(&self) -> Result<Map, StorageError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents) {
            Ok(map) => Ok(map),
            Err(e) => {
                let aside = self.corrupt_path();
                log::warn!(
                    "Discarding malformed {}: {e}; moved to {}",
                    self.path.display(),
                    aside.display()
                );
                fs::rename(&self.path, &aside)?;
                Ok(Map::new())
            }
        }
    }

    fn corrupt_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".corrupt");
        PathBuf::from(path)
    }

    fn save(&self, map: &Map) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");

        let json = serde_json::to_string_pretty(map)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalStorageBackend {
    fn name(&self) -> &'static str {
        "local-storage"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_map(|map| map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Save under the lock so concurrent writers cannot reorder snapshots.
        // The cache only changes once the new map is on disk.
        self.with_map(|map| {
            let mut next = map.clone();
            next.insert(key.to_string(), value.to_string());
            self.save(&next)?;
            *map = next;
            Ok(())
        })?
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_map(|map| {
            if !map.contains_key(key) {
                return Ok(());
            }
            let mut next = map.clone();
            next.remove(key);
            self.save(&next)?;
            *map = next;
            Ok(())
        })?
    }
}

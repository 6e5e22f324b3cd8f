//! Durable storage for the theme preference.
//!
//! The theme manager persists one string value under one key. Storage is a
//! best-effort collaborator: every failure here is reported as a
//! [`StorageError`] and absorbed by the caller.
//!
//! Implementations:
//!
//! - [`MemoryStore`]: in-process map, shared between clones
//! - [`JsonFileStore`]: JSON object file on disk
//! - [`UnavailableStore`]: always fails (storage disabled)

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

/// Error from a preference store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("preference storage is unavailable")]
    Unavailable,

    #[error("failed to access preference file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode/decode preference file {}: {source}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored value for '{key}' is not a string")]
    Corrupt { key: String },
}

/// Key-value storage for string preferences.
pub trait PreferenceStore {
    /// Reads `key`. Returns `Ok(None)` if it has never been written.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes `key`. Deleting a missing key succeeds.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object file.
///
/// All values are kept as JSON strings in a single top-level object. A
/// missing file reads as empty. Saving over a file that does not hold a JSON
/// object replaces it; a file that cannot be read is left alone and the error
/// is returned.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&content).map_err(|source| StorageError::Codec {
            path: self.path.clone(),
            source,
        })
    }

    /// Current contents for a read-modify-write. Only undecodable content is
    /// discarded.
    fn map_for_update(&self) -> Result<Map<String, Value>, StorageError> {
        match self.read_map() {
            Err(StorageError::Codec { source, .. }) => {
                debug!(
                    storage.path = %self.path.display(),
                    error = %source,
                    "Replacing corrupt preference file"
                );
                Ok(Map::new())
            }
            other => other,
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(map).map_err(|source| StorageError::Codec {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(io_err)
    }
}

impl PreferenceStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.read_map()?.remove(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(_) => Err(StorageError::Corrupt {
                key: key.to_string(),
            }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.map_for_update()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_map(&map)
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// Store that always fails, as when client storage is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl PreferenceStore for UnavailableStore {
    fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn clear(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_shared_between_clones() {
        let store = MemoryStore::new();
        let clone = store.clone();

        store.save("k", "v").unwrap();
        assert_eq!(clone.load("k").unwrap().as_deref(), Some("v"));

        clone.clear("k").unwrap();
        assert!(store.is_empty());
        assert_eq!(store.load("k").unwrap(), None);
    }

    #[test]
    fn test_json_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("prefs.json"));

        assert_eq!(store.load("theme").unwrap(), None);
        store.save("theme", "dark").unwrap();
        store.save("lang", "en").unwrap();

        let reopened = JsonFileStore::new(store.path());
        assert_eq!(reopened.load("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(reopened.load("lang").unwrap().as_deref(), Some("en"));

        reopened.clear("theme").unwrap();
        assert_eq!(store.load("theme").unwrap(), None);
        assert_eq!(store.load("lang").unwrap().as_deref(), Some("en"));
    }

    #[test]
    fn test_json_file_store_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/prefs.json"));
        store.save("theme", "light").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_json_file_store_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load("theme"), Err(StorageError::Codec { .. })));

        // Saving replaces the corrupt file.
        store.save("theme", "dark").unwrap();
        assert_eq!(store.load("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_json_file_store_unreadable_file_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::create_dir(&path).unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.map_for_update(), Err(StorageError::Io { .. })));
        assert!(matches!(store.save("theme", "dark"), Err(StorageError::Io { .. })));
        assert!(path.is_dir());
    }

    #[test]
    fn test_json_file_store_non_object_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.map_for_update().unwrap().is_empty());
        store.save("theme", "dark").unwrap();
        assert_eq!(store.load("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_json_file_store_non_string_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"theme": 42}"#).unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.load("theme").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
        assert!(err.to_string().contains("theme"));
    }

    #[test]
    fn test_unavailable_store() {
        let store = UnavailableStore;
        assert!(matches!(store.load("k"), Err(StorageError::Unavailable)));
        assert!(matches!(store.save("k", "v"), Err(StorageError::Unavailable)));
        assert!(matches!(store.clear("k"), Err(StorageError::Unavailable)));
    }
}

//! Persistent client storage backends.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token store only needs string get/set/remove. Backends:
//! - [`MemoryStorage`]: process-local map, used by tests and throwaway runs.
//! - [`FileStorage`]: one JSON object on disk, used by the CLI.
//! - [`LocalStorage`]: browser `localStorage` (`hydrate` feature).
//!
//! Reads never fail; a missing or unreadable entry reads as absent.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;
#[cfg(test)]
pub(crate) use storage_test::RejectingStorage;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("browser storage unavailable")]
    Unavailable,
    #[error("browser storage rejected write to `{0}`")]
    Rejected(String),
}

/// String key-value storage that survives for the lifetime of the client.
pub trait ClientStorage: Clone + Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the removal.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-memory storage. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// File-backed storage: all keys live in `<dir>/session.json`.
///
/// Writes go through a sibling temp file and a rename so a crash mid-write
/// never leaves a truncated session file behind.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub const FILE_NAME: &'static str = "session.json";

    /// Storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { path: dir.into().join(Self::FILE_NAME) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "ignoring unreadable session file");
                BTreeMap::new()
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ClientStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.read_map();
        map.insert(key.to_owned(), value.to_owned());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map();
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// Browser `localStorage`.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

#[cfg(feature = "hydrate")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "hydrate")]
impl ClientStorage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|_| StorageError::Rejected(key.to_owned()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .remove_item(key)
            .map_err(|_| StorageError::Rejected(key.to_owned()))
    }
}

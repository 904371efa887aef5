use super::*;

/// Memory storage whose writes to one chosen key fail.
#[derive(Clone, Debug, Default)]
pub(crate) struct RejectingStorage {
    inner: MemoryStorage,
    rejected: Arc<Mutex<Option<String>>>,
}

impl RejectingStorage {
    pub(crate) fn new(inner: MemoryStorage) -> Self {
        Self { inner, rejected: Arc::default() }
    }

    pub(crate) fn reject_writes_to(&self, key: &str) {
        *self.rejected.lock().unwrap() = Some(key.to_owned());
    }
}

impl ClientStorage for RejectingStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.rejected.lock().unwrap().as_deref() == Some(key) {
            return Err(StorageError::Rejected(key.to_owned()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_set_get_remove() {
    let storage = MemoryStorage::new();
    assert!(storage.is_empty());
    storage.set("k", "v").unwrap();
    assert_eq!(storage.get("k").as_deref(), Some("v"));
    storage.remove("k").unwrap();
    assert_eq!(storage.get("k"), None);
    assert!(storage.is_empty());
}

#[test]
fn memory_clones_share_entries() {
    let a = MemoryStorage::new();
    let b = a.clone();
    a.set("token", "abc").unwrap();
    assert_eq!(b.get("token").as_deref(), Some("abc"));
    assert_eq!(b.len(), 1);
}

#[test]
fn memory_remove_missing_is_ok() {
    assert!(MemoryStorage::new().remove("nope").is_ok());
}

// =============================================================================
// FileStorage
// =============================================================================

#[test]
fn file_missing_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("never-created"));
    assert_eq!(storage.get("token"), None);
    assert!(storage.remove("token").is_ok());
    assert!(!storage.path().exists());
}

#[test]
fn file_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    FileStorage::new(&nested).set("token", "abc").unwrap();

    let reopened = FileStorage::new(&nested);
    assert_eq!(reopened.get("token").as_deref(), Some("abc"));
    assert!(reopened.path().ends_with(FileStorage::FILE_NAME));
}

#[test]
fn file_keeps_other_keys_on_remove() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    storage.set("token", "abc").unwrap();
    storage.set("user", "{}").unwrap();
    storage.remove("token").unwrap();
    assert_eq!(storage.get("token"), None);
    assert_eq!(storage.get("user").as_deref(), Some("{}"));
}

#[test]
fn file_garbled_contents_read_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    std::fs::write(storage.path(), "not json").unwrap();
    assert_eq!(storage.get("token"), None);

    // The next write replaces the garbage with a valid map.
    storage.set("token", "fresh").unwrap();
    assert_eq!(storage.get("token").as_deref(), Some("fresh"));
}

#[test]
fn rejecting_storage_fails_only_the_chosen_key() {
    let storage = RejectingStorage::new(MemoryStorage::new());
    storage.reject_writes_to("a");
    assert!(matches!(storage.set("a", "1"), Err(StorageError::Rejected(_))));
    storage.set("b", "2").unwrap();
    assert_eq!(storage.get("a"), None);
    assert_eq!(storage.get("b").as_deref(), Some("2"));
}

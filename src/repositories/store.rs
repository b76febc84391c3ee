use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{AppError, Result};

/// Durable key-value storage the session layer persists into.
///
/// The store is injected rather than reached for globally, so tests can swap
/// in [`MemoryStore`]. Access is synchronous; overlapping writers are
/// last-write-wins with no cross-process locking.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, overwriting any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the value stored under `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

/// A file-backed store keeping one file per key inside a dedicated directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a new `FileStore` rooted at `dir`, creating the directory if needed.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory the store keeps its files in.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `FileStore`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read storage key '{}': {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_for(key), value)
            .map_err(|e| AppError::Storage(format!("Failed to write key '{}': {}", key, e)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to remove key '{}': {}",
                key, e
            ))),
        }
    }
}

/// An in-memory store used by tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates a new empty `MemoryStore`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("roster_store_{}_{}", tag, nanos))
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert_eq!(store.get("token"), None);
        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").as_deref(), Some("abc"));
        store.remove("token").unwrap();
        assert_eq!(store.get("token"), None);
    }

    #[test]
    fn file_store_round_trips() {
        let dir = unique_dir("roundtrip");
        let store = FileStore::new(&dir).unwrap();
        assert_eq!(store.get("token"), None);
        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").as_deref(), Some("abc"));
        store.set("token", "def").unwrap();
        assert_eq!(store.get("token").as_deref(), Some("def"));
        store.remove("token").unwrap();
        assert_eq!(store.get("token"), None);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn file_store_remove_of_absent_key_succeeds() {
        let dir = unique_dir("absent");
        let store = FileStore::new(&dir).unwrap();
        store.remove("never-set").unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
    }
}

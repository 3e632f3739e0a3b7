//! Durable key-value storage backends for the session token.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Well-known key the session token is stored under
pub const TOKEN_KEY: &str = "token";

/// Storage file name in the data directory
const STORAGE_FILE: &str = "storage.json";

/// Persistent key-value storage surviving process restarts.
pub trait TokenStorage: Send {
    /// Read the value stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    fn store(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ============================================================================
// File storage
// ============================================================================

/// JSON key-value file, one object mapping keys to string values.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read storage file")?;
        serde_json::from_str(&contents).context("Failed to parse storage file")
    }

    /// Entries to build the next write on. A corrupt file is discarded.
    fn entries_for_update(&self) -> Result<BTreeMap<String, String>> {
        match self.read_entries() {
            Ok(entries) => Ok(entries),
            Err(e) if self.path.exists() && e.downcast_ref::<serde_json::Error>().is_some() => {
                warn!(path = ?self.path, error = %e, "Discarding unreadable storage file");
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Replace the file atomically: write a sibling temp file, then rename it.
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to delete storage file")?;
            }
            return Ok(());
        }
        let dir = self
            .path
            .parent()
            .ok_or_else(|| anyhow!("Storage path has no parent directory"))?;
        std::fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir).context("Failed to create temp storage file")?;
        serde_json::to_writer_pretty(&mut file, entries)?;
        file.flush()?;
        file.persist(&self.path)
            .map_err(|e| e.error)
            .context("Failed to write storage file")?;
        Ok(())
    }
}

impl TokenStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn store(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)?;
        debug!(path = ?self.path, key, "Stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.entries_for_update()?;
        // Absent key with other entries left: nothing to write
        if entries.remove(key).is_none() && !entries.is_empty() {
            return Ok(());
        }
        self.write_entries(&entries)?;
        debug!(path = ?self.path, key, "Removed value");
        Ok(())
    }
}

// ============================================================================
// In-memory storage
// ============================================================================

/// Process-local storage. Clones share the same entries, so a clone kept
/// outside a `SessionStore` observes every write made through it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a session token
    pub fn with_token(token: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut entries) = storage.entries.lock() {
            entries.insert(TOKEN_KEY.to_string(), token.to_string());
        }
        storage
    }

    /// Current value under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok().and_then(|e| e.get(key).cloned())
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Memory storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Memory storage lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Memory storage lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.load(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.store(TOKEN_KEY, "tok-abc").unwrap();

        // A fresh handle reads what the first one wrote
        let reopened = FileStorage::new(dir.path());
        assert_eq!(reopened.load(TOKEN_KEY).unwrap().as_deref(), Some("tok-abc"));
    }

    #[test]
    fn test_file_storage_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.store("theme", "dark").unwrap();
        storage.store(TOKEN_KEY, "tok-abc").unwrap();
        storage.remove(TOKEN_KEY).unwrap();

        assert_eq!(storage.load("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(storage.load(TOKEN_KEY).unwrap(), None);
        assert!(storage.path().exists());
    }

    #[test]
    fn test_file_storage_remove_last_key_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.store(TOKEN_KEY, "tok-abc").unwrap();
        assert!(storage.path().exists());

        storage.remove(TOKEN_KEY).unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_remove_absent_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.remove(TOKEN_KEY).unwrap();
        storage.remove(TOKEN_KEY).unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        std::fs::write(storage.path(), "not json").unwrap();
        assert!(storage.load(TOKEN_KEY).is_err());
    }

    #[test]
    fn test_file_storage_store_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        std::fs::write(storage.path(), "{broken").unwrap();

        storage.store(TOKEN_KEY, "tok-abc").unwrap();
        assert_eq!(storage.load(TOKEN_KEY).unwrap().as_deref(), Some("tok-abc"));
    }

    #[test]
    fn test_file_storage_remove_clears_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        std::fs::write(storage.path(), "{broken").unwrap();

        storage.remove(TOKEN_KEY).unwrap();
        assert!(!storage.path().exists());
        assert_eq!(storage.load(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.store(TOKEN_KEY, "tok-1").unwrap();
        storage.store(TOKEN_KEY, "tok-2").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(STORAGE_FILE)]);
        assert_eq!(storage.load(TOKEN_KEY).unwrap().as_deref(), Some("tok-2"));
    }

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let storage = MemoryStorage::new();
        let mut writer = storage.clone();
        writer.store(TOKEN_KEY, "tok-abc").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok-abc"));

        writer.remove(TOKEN_KEY).unwrap();
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[test]
    fn test_memory_storage_with_token() {
        let storage = MemoryStorage::with_token("tok-abc");
        assert_eq!(storage.load(TOKEN_KEY).unwrap().as_deref(), Some("tok-abc"));
    }
}

//! Session identity and the small key/value store it is persisted in.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Storage key holding the session identifier.
pub const SESSION_KEY: &str = "text3d_session_id";

/// String key/value store standing in for browser local storage.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Volatile storage, used headless and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data-local-dir>/prompt3d/local_storage.json`, or the working
    /// directory when the platform has no data dir.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prompt3d")
            .join("local_storage.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw)
            .map_err(|e| Error::Storage(format!("{}: {}", self.path.display(), e)))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all().unwrap_or_else(|e| {
            warn!("Discarding unreadable storage file: {}", e);
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| Error::Storage(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// The single active session identifier, mirrored into storage.
#[derive(Debug)]
pub struct SessionStore<S: Storage> {
    storage: S,
    session_id: String,
}

impl<S: Storage> SessionStore<S> {
    /// Reads the persisted id, creating and persisting a fresh one if absent.
    ///
    /// Storage failures never prevent a session from existing: the id is then
    /// kept in memory only.
    pub fn load_or_create(mut storage: S) -> Self {
        let existing = storage.get(SESSION_KEY).unwrap_or_else(|e| {
            warn!("Could not read session id: {}", e);
            None
        });

        let session_id = match existing {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                let id = new_session_id();
                persist(&mut storage, &id);
                info!("Created session {}", id);
                id
            }
        };

        Self {
            storage,
            session_id,
        }
    }

    pub fn current(&self) -> &str {
        &self.session_id
    }

    /// Replaces the session with a brand new identifier and persists it.
    pub fn reset(&mut self) -> &str {
        self.session_id = new_session_id();
        persist(&mut self.storage, &self.session_id);
        info!("Started session {}", self.session_id);
        &self.session_id
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

fn persist<S: Storage>(storage: &mut S, id: &str) {
    if let Err(e) = storage.set(SESSION_KEY, id) {
        warn!("Could not persist session id: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_and_persists_session_when_missing() {
        let store = SessionStore::load_or_create(MemoryStorage::new());
        let persisted = store.storage().get(SESSION_KEY).unwrap();
        assert_eq!(persisted.as_deref(), Some(store.current()));
    }

    #[test]
    fn reuses_persisted_session() {
        let mut storage = MemoryStorage::new();
        storage.set(SESSION_KEY, "existing-id").unwrap();

        let store = SessionStore::load_or_create(storage);
        assert_eq!(store.current(), "existing-id");
    }

    #[test]
    fn reset_generates_fresh_id() {
        let mut store = SessionStore::load_or_create(MemoryStorage::new());
        let before = store.current().to_string();

        let after = store.reset().to_string();

        assert_ne!(before, after);
        assert_eq!(
            store.storage().get(SESSION_KEY).unwrap().as_deref(),
            Some(after.as_str())
        );
    }

    #[test]
    fn file_storage_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("store.json"));
        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn file_storage_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("store.json"));

        storage.set("theme", "dark").unwrap();
        storage.set(SESSION_KEY, "abc").unwrap();

        let reopened = FileStorage::new(storage.path());
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(reopened.get(SESSION_KEY).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(storage.get(SESSION_KEY), Err(Error::Storage(_))));

        // A session is still produced and the file is repaired on write.
        let store = SessionStore::load_or_create(FileStorage::new(&path));
        let reread = FileStorage::new(&path).get(SESSION_KEY).unwrap();
        assert_eq!(reread.as_deref(), Some(store.current()));
    }
}

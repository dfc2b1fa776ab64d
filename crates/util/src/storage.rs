//! Durable key/value storage backends.
//!
//! The search UI persists its preferences as string values under string
//! keys. [`KeyValueStorage`] abstracts the backend so the config store can
//! run against a JSON file on disk or an in-memory map in tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dirs_next::config_dir;
use thiserror::Error;
use tracing::warn;

/// Default filename for the JSON-backed storage.
pub const STORAGE_FILE_NAME: &str = "ui-storage.json";

/// Error surfaced when reading or writing storage fails.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key/value storage.
pub trait KeyValueStorage: Send + Sync {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// In-memory storage primarily used for unit testing.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a single entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::default();
        storage
            .entries
            .lock()
            .expect("storage lock poisoned")
            .insert(key.into(), value.into());
        storage
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().expect("storage lock poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .expect("storage lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage persisted as a JSON object of string values on disk.
///
/// The whole file is rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStorage {
    /// Open storage at `path`, or at the default config directory location
    /// when `None`.
    pub fn new<P: Into<Option<PathBuf>>>(path: P) -> Result<Self, StorageError> {
        let requested: Option<PathBuf> = path.into();
        let resolved_path = requested.unwrap_or_else(default_storage_path);
        let entries = load_entries(&resolved_path)?;
        Ok(Self {
            path: resolved_path,
            entries: Mutex::new(entries),
        })
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_locked(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().expect("storage lock poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().expect("storage lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        self.save_locked(&entries)
    }
}

/// `<config_dir>/duo/ui-storage.json`, falling back to the working directory.
pub fn default_storage_path() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("duo")
        .join(STORAGE_FILE_NAME)
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(entries) => Ok(entries),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse storage file; starting empty"
                );
                Ok(BTreeMap::new())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(error) => Err(StorageError::Io(error)),
    }
}

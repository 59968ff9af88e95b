//! Key-value storage backends
//!
//! High scores and settings are small JSON strings stored under a key.
//! Every backend speaks the same `KeyValueStore` trait so the callers can
//! degrade gracefully when storage is missing or broken.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored data is malformed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// String values under string keys
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Native store: every key lives in one JSON object file
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(StorageError::Serde(e)) => {
                log::warn!("Overwriting corrupt store {}: {}", self.path.display(), e);
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value.to_string());

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// Open the window's LocalStorage (fails in private modes and sandboxed frames)
    pub fn open() -> Result<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // Quota errors surface here
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }
}

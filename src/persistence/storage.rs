//! Storage backends
//!
//! A backend maps a short key to a UTF-8 document. Writes replace the whole
//! document; there is no partial-write recovery.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure talking to the underlying storage medium
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("storage backend unavailable")]
    Unavailable,
}

/// Key/value document storage
pub trait Storage {
    /// Read the document stored under `key`, `None` if nothing was ever written
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the document stored under `key`
    fn write(&mut self, key: &str, contents: &str) -> Result<(), StorageError>;
}

/// One file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.dat"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        fs::write(&path, contents).map_err(|source| StorageError::Io { path, source })
    }
}

/// In-memory storage that counts writes
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    docs: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without counting it as a write
    pub fn with_document(mut self, key: &str, contents: &str) -> Self {
        self.docs.insert(key.to_string(), contents.to_string());
        self
    }

    /// Number of successful `write` calls
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn document(&self, key: &str) -> Option<&str> {
        self.docs.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.docs.get(key).cloned())
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<(), StorageError> {
        self.docs.insert(key.to_string(), contents.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    prefix: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key)
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(&self.full_key(key))
            .map_err(|_| StorageError::Unavailable)
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(&self.full_key(key), contents)
            .map_err(|_| StorageError::Unavailable)
    }
}

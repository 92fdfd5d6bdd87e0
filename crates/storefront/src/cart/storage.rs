//! Durable key-value storage for cart documents.
//!
//! The cart store only needs `read`/`write` of whole string documents by
//! key, the same contract browser local storage offers. Two backends:
//!
//! - [`MemoryStorage`] - in-process map, used in tests and as the
//!   per-request snapshot of a session cart
//! - [`FileStorage`] - one file per key in a directory, atomic replace

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Key cannot be mapped to a storage location.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Key-value storage holding serialized documents.
pub trait CartStorage {
    /// Read the document stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage seeded with one document.
    #[must_use]
    pub fn with_document(key: &str, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.into());
        Self { entries }
    }

    /// Get the document under `key` without going through the trait.
    #[must_use]
    pub fn document(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed storage, one `<key>.json` file per key.
///
/// Writes go to a temporary sibling file which is then renamed over the
/// target, so readers never observe a half-written document.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the storage root. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use `dir` as the storage root, creating it now.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created, for
    /// example when `dir` names an existing file.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl CartStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value).map_err(|source| StorageError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| StorageError::Io { path, source })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_missing() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read("cart").unwrap(), None);
    }

    #[test]
    fn test_memory_write_then_read() {
        let mut storage = MemoryStorage::new();
        storage.write("cart", "[]").unwrap();
        assert_eq!(storage.read("cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.document("cart"), Some("[]"));
    }

    #[test]
    fn test_file_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.read("cart").unwrap(), None);
    }

    #[test]
    fn test_file_write_creates_dir_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested");
        let mut storage = FileStorage::new(&root);
        storage.write("cart", r#"[{"a":1}]"#).unwrap();

        let reopened = FileStorage::new(&root);
        assert_eq!(reopened.read("cart").unwrap().as_deref(), Some(r#"[{"a":1}]"#));
        assert!(!root.join("cart.json.tmp").exists());
    }

    #[test]
    fn test_file_overwrite_replaces_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.write("cart", "first").unwrap();
        storage.write("cart", "second").unwrap();
        assert_eq!(storage.read("cart").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_file_open_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("carts");
        FileStorage::open(&root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_file_open_rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cart-dir");
        fs::write(&file, "not a directory").unwrap();
        assert!(matches!(
            FileStorage::open(&file),
            Err(StorageError::Io { .. })
        ));
    }

    #[test]
    fn test_file_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.write("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.read(""), Err(StorageError::InvalidKey(_))));
    }
}

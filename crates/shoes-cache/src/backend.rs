//! Storage backends for the Key-Value store.
//!
//! Values are stored as strings, the way browser `localStorage` does, so a
//! snapshot written by one backend reads back byte-for-byte from another.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::CacheError;

/// Raw string Key-Value storage.
pub trait KvBackend: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, CacheError> {
    mutex
        .lock()
        .map_err(|e| CacheError::StoreError(format!("store lock poisoned: {}", e)))
}

/// In-memory backend (for development/testing).
///
/// Clones share the same underlying map, so a test can keep one clone to
/// inspect what another wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

/// File backend holding every key in one JSON document.
///
/// The whole document is rewritten on each mutation through a temporary
/// file and a rename, so a crash mid-write leaves the previous document.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => HashMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                CacheError::OpenError(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(CacheError::OpenError(format!("{}: {}", path.display(), e)));
            }
        };

        debug!(path = %path.display(), keys = entries.len(), "opened file store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CacheError::StoreError(format!("{}: {}", parent.display(), e))
                })?;
            }
        }

        let document = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, document)
            .map_err(|e| CacheError::StoreError(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| CacheError::StoreError(format!("{}: {}", self.path.display(), e)))
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = lock(&self.entries)?;
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&entries) {
            // Keep memory in step with disk.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = lock(&self.entries)?;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush(&entries) {
            entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_shared_between_clones() {
        let backend = MemoryBackend::new();
        let observer = backend.clone();

        backend.set("@RocketShoes:cart", "[]").unwrap();
        assert_eq!(
            observer.get("@RocketShoes:cart").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_memory_backend_delete_missing_is_ok() {
        let backend = MemoryBackend::new();
        assert!(backend.delete("missing").is_ok());
        assert!(backend.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_file_backend_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        {
            let backend = FileBackend::open(&path).unwrap();
            backend.set("@RocketShoes:cart", r#"[{"id":1,"amount":2}]"#).unwrap();
            backend.set("other", "x").unwrap();
        }

        let reopened = FileBackend::open(&path).unwrap();
        assert_eq!(
            reopened.get("@RocketShoes:cart").unwrap().as_deref(),
            Some(r#"[{"id":1,"amount":2}]"#)
        );
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_file_backend_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.set("k", "v").unwrap();
        backend.delete("k").unwrap();

        let reopened = FileBackend::open(&path).unwrap();
        assert!(reopened.get("k").unwrap().is_none());
    }

    #[test]
    fn test_file_backend_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let err = FileBackend::open(&path).unwrap_err();
        assert!(matches!(err, CacheError::OpenError(_)));
    }

    #[test]
    fn test_file_backend_empty_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "").unwrap();

        let backend = FileBackend::open(&path).unwrap();
        assert!(backend.get("@RocketShoes:cart").unwrap().is_none());
    }

    #[test]
    fn test_file_backend_failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("store");
        let path = parent.join("storage.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.set("k", "old").unwrap();

        // Turn the parent directory into a plain file so every flush fails.
        fs::remove_dir_all(&parent).unwrap();
        fs::write(&parent, "").unwrap();

        let err = backend.set("k", "new").unwrap_err();
        assert!(matches!(err, CacheError::StoreError(_)));
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("old"));

        let err = backend.set("fresh", "v").unwrap_err();
        assert!(matches!(err, CacheError::StoreError(_)));
        assert!(backend.get("fresh").unwrap().is_none());
    }

    #[test]
    fn test_file_backend_failed_delete_keeps_entry() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("store");
        let path = parent.join("storage.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.set("k", "v").unwrap();

        fs::remove_dir_all(&parent).unwrap();
        fs::write(&parent, "").unwrap();

        assert!(backend.delete("k").is_err());
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
    }
}

//! Key-Value store wrapper with automatic serialization.

use std::path::Path;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::backend::{FileBackend, KvBackend, MemoryBackend};
use crate::CacheError;

/// Type-safe cache over a [`KvBackend`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn KvBackend>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl Cache {
    /// Wrap an existing backend.
    pub fn with_backend(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Open a fresh in-memory store.
    pub fn open_memory() -> Self {
        Self::with_backend(MemoryBackend::new())
    }

    /// Open the file store at `path`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open_file(".shoes/storage.json")?;
    /// ```
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        Ok(Self::with_backend(FileBackend::open(path)?))
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cart: Option<Vec<Product>> = cache.get("@RocketShoes:cart")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key)? {
            Some(raw) => {
                let value: T = serde_json::from_str(&raw)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a value in the cache, replacing whatever was stored.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)?;
        debug!(key, bytes = raw.len(), "writing cache entry");
        self.backend.set(key, &raw)
    }

    /// Get the raw stored string without decoding it.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.backend.get(key)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        debug!(key, "deleting cache entry");
        self.backend.delete(key)
    }
}

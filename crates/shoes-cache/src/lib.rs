//! Type-safe Key-Value persistence for the Shoes storefront cart.
//!
//! Provides a simple API for keeping JSON-serialized values in a
//! Key-Value store, in memory or in a file on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use shoes_cache::Cache;
//!
//! let cache = Cache::open_file(".shoes/storage.json")?;
//!
//! // Store a value
//! cache.set("@RocketShoes:cart", &cart)?;
//!
//! // Retrieve a value
//! let cart: Option<Vec<Product>> = cache.get("@RocketShoes:cart")?;
//!
//! // Delete a value
//! cache.delete("@RocketShoes:cart")?;
//! ```

mod backend;
mod error;
mod kv;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use error::CacheError;
pub use kv::Cache;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, KvBackend};
}

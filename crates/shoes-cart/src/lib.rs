//! Persisted shopping cart for the Shoes storefront.
//!
//! This crate keeps the shopper's cart in memory, validates every mutation
//! against the storefront's catalog and stock services, and mirrors the
//! cart into a Key-Value slot so it survives restarts:
//!
//! - **Catalog**: Product and stock records served by the storefront API
//! - **Cart**: The cart itself, its reconciliation rules and pricing
//! - **Manager**: Fetch, validate, persist, notify
//! - **Service**: A task that applies mutations one at a time
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shoes_cart::prelude::*;
//! use shoes_cache::Cache;
//!
//! let api = Arc::new(HttpStoreApi::new("http://localhost:3333"));
//! let cache = Cache::open_file(".shoes/storage.json")?;
//!
//! let manager = CartManager::builder(api, cache).load()?;
//! let service = CartService::spawn(manager);
//! let cart = service.handle();
//!
//! cart.add_product(1u64).await?;
//! cart.update_product_amount(UpdateProductAmount::new(1u64, 2)).await?;
//!
//! println!("{} units", cart.cart().item_count());
//! ```

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ids;
pub mod manager;
pub mod money;
pub mod notify;
pub mod service;

pub use error::CartError;
pub use ids::ProductId;
pub use manager::{CartManager, CartManagerBuilder};
pub use money::{Currency, Money};
pub use service::{CartHandle, CartService};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CartError;
    pub use crate::ids::ProductId;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::api::{HttpStoreApi, StaticStoreApi, StoreApi};
    pub use crate::catalog::{Product, StockEntry};

    // Cart
    pub use crate::cart::{Cart, CartPricing, LineItemPricing, UpdateProductAmount};
    pub use crate::config::{ApiConfig, CartConfig, StorageConfig, DEFAULT_CART_KEY};
    pub use crate::manager::{CartManager, CartManagerBuilder};
    pub use crate::notify::{
        CartMessages, CartOperation, Notice, NoticeKind, Notifier, RecordingNotifier,
        TracingNotifier,
    };
    pub use crate::service::{CartHandle, CartService};
}

//! Cart error types.

use crate::ids::ProductId;
use thiserror::Error;

/// Errors that can occur in cart operations.
#[derive(Error, Debug)]
pub enum CartError {
    /// Requested quantity exceeds the available stock.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Product not present in the catalog.
    #[error("Product not found in catalog: {0}")]
    ProductNotFound(ProductId),

    /// Product has no stock record.
    #[error("No stock entry for product: {0}")]
    StockNotFound(ProductId),

    /// Arithmetic overflow in a quantity or money calculation.
    #[error("Arithmetic overflow in cart calculation")]
    Overflow,

    /// Catalog or stock service request failed.
    #[error("Store API error: {0}")]
    Fetch(#[from] shoes_data::FetchError),

    /// Persisted slot could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] shoes_cache::CacheError),

    /// Persisted snapshot exists but does not decode as a cart.
    #[error("Malformed cart snapshot under {key}: {message}")]
    Snapshot { key: String, message: String },

    /// The cart service has shut down.
    #[error("Cart service is closed")]
    ServiceClosed,
}

impl CartError {
    /// Whether this is the user-correctable out-of-stock rejection.
    pub fn is_out_of_stock(&self) -> bool {
        matches!(self, CartError::OutOfStock { .. })
    }
}

//! Stock records.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// Maximum purchasable quantity for a product, owned by the stock service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockEntry {
    /// Product the entry applies to.
    pub id: ProductId,
    /// Units available.
    pub amount: i64,
}

impl StockEntry {
    /// Create a new stock entry.
    pub fn new(id: impl Into<ProductId>, amount: i64) -> Self {
        Self {
            id: id.into(),
            amount,
        }
    }

    /// Check if a specific quantity is available.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.amount >= quantity
    }
}

/// First stock entry with the given id.
pub fn find_stock(entries: &[StockEntry], id: ProductId) -> Option<&StockEntry> {
    entries.iter().find(|s| s.id == id)
}

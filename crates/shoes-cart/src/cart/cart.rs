//! Cart contents and the reconciliation rules applied to them.
//!
//! Every rule here is pure: it reads the current cart plus whatever the
//! catalog and stock services returned and produces the next cart. The
//! manager decides when to fetch and when to commit.

use crate::catalog::{find_product, find_stock, Product, StockEntry};
use crate::error::CartError;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// An ordered, identifier-unique sequence of products.
///
/// Serializes as a bare JSON array, which is the snapshot format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Product>,
}

/// Arguments of a quantity update.
///
/// `amount` is a signed delta added to the current quantity, not the new
/// quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    /// Product to update.
    pub product_id: ProductId,
    /// Quantity delta.
    pub amount: i64,
}

impl UpdateProductAmount {
    /// Create an update for `product_id` shifting its quantity by `amount`.
    pub fn new(product_id: impl Into<ProductId>, amount: i64) -> Self {
        Self {
            product_id: product_id.into(),
            amount,
        }
    }
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from items in order.
    pub fn from_items(items: Vec<Product>) -> Self {
        Self { items }
    }

    /// Items in cart order.
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// First entry with the given id.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == id)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all entries.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|p| p.amount).sum()
    }

    /// Cart after adding one unit of `id`.
    ///
    /// A product already in the cart needs a stock entry with room for one
    /// more unit; it is incremented and moved to the tail. A new product is
    /// copied from the catalog with amount 1 and appended. New products are
    /// not checked against stock.
    pub fn with_added(
        &self,
        id: ProductId,
        stock: &[StockEntry],
        catalog: &[Product],
    ) -> Result<Cart, CartError> {
        match self.get(id) {
            Some(current) => {
                let stock = find_stock(stock, id).ok_or(CartError::StockNotFound(id))?;
                let requested = current.amount.checked_add(1).ok_or(CartError::Overflow)?;

                if !stock.can_fulfill(requested) {
                    return Err(CartError::OutOfStock {
                        product_id: id,
                        requested,
                        available: stock.amount,
                    });
                }

                let mut updated = current.clone();
                updated.amount = requested;
                Ok(self.with_moved_to_tail(updated))
            }
            None => {
                let mut added = find_product(catalog, id)
                    .ok_or(CartError::ProductNotFound(id))?
                    .clone();
                added.amount = 1;

                let mut items = self.items.clone();
                items.push(added);
                Ok(Cart { items })
            }
        }
    }

    /// Cart without any entry for `id`. Relative order of the rest is kept.
    pub fn without(&self, id: ProductId) -> Cart {
        Cart {
            items: self.items.iter().filter(|p| p.id != id).cloned().collect(),
        }
    }

    /// Cart after shifting the quantity of `update.product_id` by
    /// `update.amount`.
    ///
    /// The touched entry moves to the tail. No stock check and no lower
    /// bound: a delta can take the amount to zero or below. An id not in
    /// the cart leaves the cart as it is.
    pub fn with_amount_delta(&self, update: UpdateProductAmount) -> Result<Cart, CartError> {
        match self.get(update.product_id) {
            Some(current) => {
                let mut updated = current.clone();
                updated.amount = current
                    .amount
                    .checked_add(update.amount)
                    .ok_or(CartError::Overflow)?;
                Ok(self.with_moved_to_tail(updated))
            }
            None => Ok(self.without(update.product_id)),
        }
    }

    fn with_moved_to_tail(&self, entry: Product) -> Cart {
        let mut next = self.without(entry.id);
        next.items.push(entry);
        next
    }
}

impl From<Vec<Product>> for Cart {
    fn from(items: Vec<Product>) -> Self {
        Self::from_items(items)
    }
}

//! Product records.

use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A product as served by the catalog and held in the cart.
///
/// Only `id` and `amount` carry meaning for the cart. Everything else the
/// catalog sends (title, price, image, ...) is kept as-is in `extra`, so a
/// record with an odd display field still decodes and survives the
/// snapshot round trip untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,
    /// Quantity held in the cart. Catalog records omit it.
    #[serde(default)]
    pub amount: i64,
    /// Display fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create a bare product record.
    pub fn new(id: impl Into<ProductId>) -> Self {
        Self {
            id: id.into(),
            amount: 0,
            extra: Map::new(),
        }
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.extra.insert("title".to_string(), Value::String(title.into()));
        self
    }

    /// Set the unit price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.extra.insert("price".to_string(), Value::from(price));
        self
    }

    /// Set the quantity.
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }

    /// Display title, if the catalog sent a string one.
    pub fn title(&self) -> Option<&str> {
        self.extra.get("title").and_then(Value::as_str)
    }

    /// Unit price as a decimal.
    ///
    /// Accepts a JSON number or a numeric string; any other shape is `None`.
    pub fn price(&self) -> Option<f64> {
        match self.extra.get("price")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|p| p.is_finite()),
            _ => None,
        }
    }

    /// Unit price in `currency`, zero when the catalog sent none.
    pub fn unit_price(&self, currency: Currency) -> Money {
        self.price()
            .map(|price| Money::from_decimal(price, currency))
            .unwrap_or_else(|| Money::zero(currency))
    }

    /// Title for display, falling back to the id.
    pub fn display_title(&self) -> String {
        self.title()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Product #{}", self.id))
    }
}

/// First catalog record with the given id.
pub fn find_product(products: &[Product], id: ProductId) -> Option<&Product> {
    products.iter().find(|p| p.id == id)
}

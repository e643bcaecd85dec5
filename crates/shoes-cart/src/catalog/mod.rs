//! Catalog module.
//!
//! Contains the product and stock records served by the storefront API.

mod product;
mod stock;

pub use product::{find_product, Product};
pub use stock::{find_stock, StockEntry};

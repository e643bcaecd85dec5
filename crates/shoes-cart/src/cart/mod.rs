//! Shopping cart module.
//!
//! Contains the cart type, its reconciliation rules and pricing.

mod cart;
mod pricing;

pub use cart::{Cart, UpdateProductAmount};
pub use pricing::{CartPricing, LineItemPricing};

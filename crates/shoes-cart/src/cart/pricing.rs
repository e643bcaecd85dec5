//! Cart pricing calculations.

use crate::cart::Cart;
use crate::error::CartError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Pricing breakdown for a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartPricing {
    /// Sum of all line totals.
    pub subtotal: Money,
    /// Per-line breakdown, in cart order.
    pub line_items: Vec<LineItemPricing>,
}

/// Pricing breakdown for a single cart entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItemPricing {
    /// Product ID.
    pub product_id: ProductId,
    /// Unit price.
    pub unit_price: Money,
    /// Quantity.
    pub amount: i64,
    /// unit_price * amount.
    pub total: Money,
}

impl Cart {
    /// Calculate cart pricing.
    ///
    /// Returns error if arithmetic overflow occurs.
    pub fn calculate_pricing(&self, currency: Currency) -> Result<CartPricing, CartError> {
        let mut subtotal = Money::zero(currency);
        let mut line_items = Vec::with_capacity(self.len());

        for product in self.items() {
            let unit_price = product.unit_price(currency);
            let total = unit_price
                .try_multiply(product.amount)
                .ok_or(CartError::Overflow)?;
            subtotal = subtotal.try_add(&total).ok_or(CartError::Overflow)?;

            line_items.push(LineItemPricing {
                product_id: product.id,
                unit_price,
                amount: product.amount,
                total,
            });
        }

        Ok(CartPricing {
            subtotal,
            line_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    #[test]
    fn test_pricing() {
        let cart = Cart::from_items(vec![
            Product::new(1).with_price(179.9).with_amount(2),
            Product::new(2).with_price(139.9).with_amount(1),
        ]);

        let pricing = cart.calculate_pricing(Currency::BRL).unwrap();
        assert_eq!(pricing.subtotal.amount_cents, 49970); // 2*17990 + 13990
        assert_eq!(pricing.subtotal.display(), "R$ 499,70");
        assert_eq!(pricing.line_items.len(), 2);
        assert_eq!(pricing.line_items[0].total.amount_cents, 35980);
    }

    #[test]
    fn test_pricing_without_prices_is_zero() {
        let cart = Cart::from_items(vec![Product::new(1).with_amount(3)]);
        let pricing = cart.calculate_pricing(Currency::BRL).unwrap();
        assert_eq!(pricing.subtotal, Money::zero(Currency::BRL));
    }

    #[test]
    fn test_pricing_overflow() {
        let cart = Cart::from_items(vec![Product::new(1).with_price(1.0).with_amount(i64::MAX)]);
        assert!(matches!(
            cart.calculate_pricing(Currency::BRL),
            Err(CartError::Overflow)
        ));
    }
}

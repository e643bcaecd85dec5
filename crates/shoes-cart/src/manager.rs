//! The cart manager.
//!
//! Owns the current cart, validates mutations against the storefront API
//! and keeps the persisted snapshot in step with memory.

use std::sync::Arc;

use shoes_cache::Cache;
use tracing::{debug, info, warn};

use crate::api::StoreApi;
use crate::cart::{Cart, CartPricing, UpdateProductAmount};
use crate::config::{CartConfig, DEFAULT_CART_KEY};
use crate::error::CartError;
use crate::ids::ProductId;
use crate::money::Currency;
use crate::notify::{CartMessages, CartOperation, Notifier, TracingNotifier};

/// Single owner of the cart state.
///
/// Every committed mutation writes the full cart to the persisted slot
/// before it becomes visible in memory; a failed write leaves both at the
/// previous value. Failed operations emit exactly one notice and return
/// the typed reason.
pub struct CartManager {
    cart: Cart,
    api: Arc<dyn StoreApi>,
    cache: Cache,
    key: String,
    notifier: Arc<dyn Notifier>,
    messages: CartMessages,
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("key", &self.key)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CartManager`].
pub struct CartManagerBuilder {
    api: Arc<dyn StoreApi>,
    cache: Cache,
    key: String,
    notifier: Arc<dyn Notifier>,
    messages: CartMessages,
}

impl CartManagerBuilder {
    /// Storage key for the snapshot.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Where notices go. Defaults to [`TracingNotifier`].
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Notice texts.
    pub fn with_messages(mut self, messages: CartMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Take key and messages from configuration.
    pub fn with_config(self, config: &CartConfig) -> Self {
        self.with_key(config.storage.key.clone())
            .with_messages(config.messages.clone())
    }

    /// Read the persisted snapshot and build the manager.
    ///
    /// A missing or blank slot yields an empty cart. A slot that holds
    /// anything else that does not decode as a cart is an error.
    pub fn load(self) -> Result<CartManager, CartError> {
        let cart = match self.cache.get_raw(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str::<Cart>(&raw).map_err(|e| CartError::Snapshot {
                    key: self.key.clone(),
                    message: e.to_string(),
                })?
            }
            _ => Cart::new(),
        };

        info!(key = %self.key, items = cart.len(), "loaded cart");

        Ok(CartManager {
            cart,
            api: self.api,
            cache: self.cache,
            key: self.key,
            notifier: self.notifier,
            messages: self.messages,
        })
    }
}

impl CartManager {
    /// Start building a manager over `api` and `cache`.
    pub fn builder(api: Arc<dyn StoreApi>, cache: Cache) -> CartManagerBuilder {
        CartManagerBuilder {
            api,
            cache,
            key: DEFAULT_CART_KEY.to_string(),
            notifier: Arc::new(TracingNotifier),
            messages: CartMessages::default(),
        }
    }

    /// Current cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Storage key of the snapshot.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of distinct products in the cart.
    pub fn cart_size(&self) -> usize {
        self.cart.len()
    }

    /// Total units across the cart.
    pub fn item_count(&self) -> i64 {
        self.cart.item_count()
    }

    /// Price the current cart.
    pub fn pricing(&self, currency: Currency) -> Result<CartPricing, CartError> {
        self.cart.calculate_pricing(currency)
    }

    /// Add one unit of `product_id`.
    ///
    /// Fetches stock and catalog. A product already in the cart is
    /// incremented if stock allows and moved to the tail; a new product is
    /// appended with amount 1.
    pub async fn add_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let result = self.try_add_product(product_id).await;
        self.settle(CartOperation::AddProduct, product_id, result)
    }

    async fn try_add_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let stock = self.api.fetch_stock().await?;
        let products = self.api.fetch_products().await?;

        let next = self.cart.with_added(product_id, &stock, &products)?;
        self.commit(next)
    }

    /// Drop every entry for `product_id`. Absent ids still commit.
    pub async fn remove_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let next = self.cart.without(product_id);
        let result = self.commit(next);
        self.settle(CartOperation::RemoveProduct, product_id, result)
    }

    /// Shift the quantity of `update.product_id` by `update.amount`.
    ///
    /// The catalog must be reachable, but stock is not consulted.
    pub async fn update_product_amount(
        &mut self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        let result = self.try_update_product_amount(update).await;
        self.settle(CartOperation::UpdateProductAmount, update.product_id, result)
    }

    async fn try_update_product_amount(
        &mut self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        self.api.fetch_products().await?;

        let next = self.cart.with_amount_delta(update)?;
        self.commit(next)
    }

    fn commit(&mut self, next: Cart) -> Result<(), CartError> {
        self.cache.set(&self.key, &next)?;
        debug!(key = %self.key, items = next.len(), units = next.item_count(), "cart committed");
        self.cart = next;
        Ok(())
    }

    fn settle(
        &self,
        operation: CartOperation,
        product_id: ProductId,
        result: Result<(), CartError>,
    ) -> Result<(), CartError> {
        if let Err(error) = &result {
            if error.is_out_of_stock() {
                info!(operation = operation.as_str(), %product_id, "{}", error);
            } else {
                warn!(operation = operation.as_str(), %product_id, %error, "cart operation failed");
            }
            self.notifier.notify(&self.messages.notice_for(operation, error));
        }
        result
    }
}

//! Serialized access to a [`CartManager`].
//!
//! The manager runs on its own task and applies mutations strictly in
//! arrival order, each one seeing the cart left by the previous one.
//! Callers talk to it through a cloneable [`CartHandle`].

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cart::{Cart, UpdateProductAmount};
use crate::error::CartError;
use crate::ids::ProductId;
use crate::manager::CartManager;

/// Capacity of the command queue.
pub const COMMAND_BUFFER: usize = 64;

type Reply = oneshot::Sender<Result<(), CartError>>;

enum Command {
    Add { product_id: ProductId, reply: Reply },
    Remove { product_id: ProductId, reply: Reply },
    Update { update: UpdateProductAmount, reply: Reply },
    Shutdown,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Add { product_id, .. } => write!(f, "Add({product_id})"),
            Command::Remove { product_id, .. } => write!(f, "Remove({product_id})"),
            Command::Update { update, .. } => write!(f, "Update({update:?})"),
            Command::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// A running cart worker.
pub struct CartService {
    handle: CartHandle,
    task: JoinHandle<CartManager>,
}

impl std::fmt::Debug for CartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService").finish_non_exhaustive()
    }
}

impl CartService {
    /// Move `manager` onto a worker task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(manager: CartManager) -> Self {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let (cart_tx, cart_rx) = watch::channel(manager.cart().clone());

        let task = tokio::spawn(run(manager, rx, cart_tx));

        Self {
            handle: CartHandle {
                commands,
                cart: cart_rx,
            },
            task,
        }
    }

    /// A handle for issuing commands.
    pub fn handle(&self) -> CartHandle {
        self.handle.clone()
    }

    /// Stop the worker once the commands queued so far are applied, and
    /// take the manager back.
    pub async fn shutdown(self) -> Result<CartManager, CartError> {
        // The worker may already be gone; the join below reports that.
        let _ = self.handle.commands.send(Command::Shutdown).await;
        self.task.await.map_err(|_| CartError::ServiceClosed)
    }
}

async fn run(
    mut manager: CartManager,
    mut commands: mpsc::Receiver<Command>,
    cart: watch::Sender<Cart>,
) -> CartManager {
    info!(key = manager.key(), "cart service started");

    while let Some(command) = commands.recv().await {
        let (reply, result) = match command {
            Command::Add { product_id, reply } => {
                (reply, manager.add_product(product_id).await)
            }
            Command::Remove { product_id, reply } => {
                (reply, manager.remove_product(product_id).await)
            }
            Command::Update { update, reply } => {
                (reply, manager.update_product_amount(update).await)
            }
            Command::Shutdown => break,
        };

        cart.send_if_modified(|current| {
            if *current == *manager.cart() {
                return false;
            }
            *current = manager.cart().clone();
            true
        });

        if reply.send(result).is_err() {
            debug!("caller went away before the reply");
        }
    }

    info!(key = manager.key(), "cart service stopped");
    manager
}

/// Cloneable front end of a [`CartService`].
///
/// Once the service has stopped every call returns
/// [`CartError::ServiceClosed`] and no notice is emitted: the notifier
/// belongs to the stopped worker, so the caller must report it.
#[derive(Debug, Clone)]
pub struct CartHandle {
    commands: mpsc::Sender<Command>,
    cart: watch::Receiver<Cart>,
}

impl CartHandle {
    /// Queue an add and wait for its outcome.
    pub async fn add_product(&self, product_id: impl Into<ProductId>) -> Result<(), CartError> {
        let product_id = product_id.into();
        self.call(|reply| Command::Add { product_id, reply }).await
    }

    /// Queue a remove and wait for its outcome.
    pub async fn remove_product(
        &self,
        product_id: impl Into<ProductId>,
    ) -> Result<(), CartError> {
        let product_id = product_id.into();
        self.call(|reply| Command::Remove { product_id, reply }).await
    }

    /// Queue a quantity update and wait for its outcome.
    pub async fn update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        self.call(|reply| Command::Update { update, reply }).await
    }

    /// Latest committed cart.
    pub fn cart(&self) -> Cart {
        self.cart.borrow().clone()
    }

    /// Receiver that wakes on every committed change.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.cart.clone()
    }

    async fn call(&self, command: impl FnOnce(Reply) -> Command) -> Result<(), CartError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| CartError::ServiceClosed)?;
        outcome.await.map_err(|_| CartError::ServiceClosed)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StaticStoreApi;
    use crate::catalog::{Product, StockEntry};
    use crate::notify::RecordingNotifier;
    use futures::future::join_all;
    use shoes_cache::Cache;
    use std::sync::Arc;

    fn manager(stock: i64, notifier: &RecordingNotifier) -> CartManager {
        let api = Arc::new(StaticStoreApi::new(
            vec![Product::new(1).with_title("Tênis"), Product::new(2)],
            vec![StockEntry::new(1, stock), StockEntry::new(2, stock)],
        ));
        CartManager::builder(api, Cache::open_memory())
            .with_notifier(Arc::new(notifier.clone()))
            .load()
            .unwrap()
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_serialized() {
        let notifier = RecordingNotifier::new();
        let service = CartService::spawn(manager(10, &notifier));
        let handle = service.handle();

        let results = join_all((0..5).map(|_| handle.add_product(1u64))).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(handle.cart().get(ProductId::new(1)).unwrap().amount, 5);
        assert!(notifier.notices().is_empty());

        let manager = service.shutdown().await.unwrap();
        assert_eq!(manager.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_adds_respect_stock() {
        let notifier = RecordingNotifier::new();
        let service = CartService::spawn(manager(3, &notifier));
        let handle = service.handle();

        let results = join_all((0..5).map(|_| handle.add_product(1u64))).await;

        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_out_of_stock()))
            .count();
        assert_eq!(rejected, 2);
        assert_eq!(handle.cart().get(ProductId::new(1)).unwrap().amount, 3);
        assert_eq!(notifier.notices().len(), 2);
    }

    #[tokio::test]
    async fn test_subscribe_sees_commits() {
        let notifier = RecordingNotifier::new();
        let service = CartService::spawn(manager(5, &notifier));
        let handle = service.handle();
        let mut updates = handle.subscribe();

        handle.add_product(2u64).await.unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().len(), 1);

        handle
            .update_product_amount(UpdateProductAmount::new(2, 4))
            .await
            .unwrap();
        handle.remove_product(2u64).await.unwrap();
        assert!(handle.cart().is_empty());
    }

    #[tokio::test]
    async fn test_handle_after_shutdown() {
        let notifier = RecordingNotifier::new();
        let service = CartService::spawn(manager(5, &notifier));
        let handle = service.handle();

        handle.add_product(1u64).await.unwrap();
        let manager = service.shutdown().await.unwrap();
        assert_eq!(manager.cart().len(), 1);

        let err = handle.add_product(1u64).await.unwrap_err();
        assert!(matches!(err, CartError::ServiceClosed));
        assert!(notifier.notices().is_empty());
    }
}

//! User-facing notices.
//!
//! Cart operations never surface raw errors to the shopper. A failed
//! operation produces one [`Notice`] carrying a localized message, which
//! the embedding UI renders as a toast.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CartError;

/// The cart operations that can emit a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartOperation {
    AddProduct,
    RemoveProduct,
    UpdateProductAmount,
}

impl CartOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartOperation::AddProduct => "add_product",
            CartOperation::RemoveProduct => "remove_product",
            CartOperation::UpdateProductAmount => "update_product_amount",
        }
    }
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a notice was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// The shopper asked for more units than are in stock.
    OutOfStock,
    /// Anything else went wrong.
    Failure,
}

/// A toast-style message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub operation: CartOperation,
    pub kind: NoticeKind,
    pub message: String,
}

/// Localized notice texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMessages {
    /// Shown when an add would exceed stock.
    #[serde(default = "default_out_of_stock")]
    pub out_of_stock: String,

    /// Shown when adding fails for any other reason.
    #[serde(default = "default_add_failed")]
    pub add_failed: String,

    /// Shown when removing fails.
    #[serde(default = "default_remove_failed")]
    pub remove_failed: String,

    /// Shown when a quantity update fails.
    #[serde(default = "default_update_failed")]
    pub update_failed: String,
}

fn default_out_of_stock() -> String {
    "Quantidade solicitada fora de estoque".to_string()
}

fn default_add_failed() -> String {
    "Erro na adição do produto".to_string()
}

fn default_remove_failed() -> String {
    "Erro na remoção do produto".to_string()
}

fn default_update_failed() -> String {
    "Erro na alteração de quantidade do produto".to_string()
}

impl Default for CartMessages {
    fn default() -> Self {
        Self {
            out_of_stock: default_out_of_stock(),
            add_failed: default_add_failed(),
            remove_failed: default_remove_failed(),
            update_failed: default_update_failed(),
        }
    }
}

impl CartMessages {
    /// Build the notice for a failed operation.
    ///
    /// Only an out-of-stock add gets its own text; every other failure of
    /// an operation shares that operation's generic message.
    pub fn notice_for(&self, operation: CartOperation, error: &CartError) -> Notice {
        let (kind, message) = match operation {
            CartOperation::AddProduct if error.is_out_of_stock() => {
                (NoticeKind::OutOfStock, &self.out_of_stock)
            }
            CartOperation::AddProduct => (NoticeKind::Failure, &self.add_failed),
            CartOperation::RemoveProduct => (NoticeKind::Failure, &self.remove_failed),
            CartOperation::UpdateProductAmount => (NoticeKind::Failure, &self.update_failed),
        };

        Notice {
            operation,
            kind,
            message: message.clone(),
        }
    }
}

/// Sink for notices.
pub trait Notifier: Send + Sync {
    /// Deliver one notice to the shopper.
    fn notify(&self, notice: &Notice);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        warn!(
            operation = notice.operation.as_str(),
            kind = ?notice.kind,
            "{}",
            notice.message
        );
    }
}

/// Notifier that keeps every notice for later inspection.
///
/// Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    /// Messages received so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice.clone());
        }
    }
}

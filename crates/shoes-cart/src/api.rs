//! Catalog and stock service access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use shoes_data::{FetchClient, FetchError};
use tracing::debug;

use crate::catalog::{Product, StockEntry};
use crate::config::ApiConfig;

/// Path of the stock listing.
pub const STOCK_PATH: &str = "/stock";

/// Path of the product catalog listing.
pub const PRODUCTS_PATH: &str = "/products";

/// Read-only storefront services the cart validates against.
#[async_trait]
pub trait StoreApi: Send + Sync {
    /// Fetch the full stock list.
    async fn fetch_stock(&self) -> Result<Vec<StockEntry>, FetchError>;

    /// Fetch the full product catalog.
    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError>;
}

/// [`StoreApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStoreApi {
    client: FetchClient,
}

impl HttpStoreApi {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(FetchClient::new().with_base_url(base_url))
    }

    /// Create a client from configuration.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::with_client(
            FetchClient::new()
                .with_base_url(config.base_url.clone())
                .with_timeout(Duration::from_secs(config.timeout_secs)),
        )
    }

    /// Use a preconfigured fetch client.
    pub fn with_client(client: FetchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StoreApi for HttpStoreApi {
    async fn fetch_stock(&self) -> Result<Vec<StockEntry>, FetchError> {
        let stock: Vec<StockEntry> = self.client.get_json(STOCK_PATH).await?;
        debug!(entries = stock.len(), "fetched stock");
        Ok(stock)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError> {
        let products: Vec<Product> = self.client.get_json(PRODUCTS_PATH).await?;
        debug!(entries = products.len(), "fetched catalog");
        Ok(products)
    }
}

#[derive(Debug, Default)]
struct StaticState {
    products: Vec<Product>,
    stock: Vec<StockEntry>,
    unavailable: bool,
}

/// In-memory [`StoreApi`] (for development/testing).
///
/// Serves fixed lists, can be switched to fail every request, and counts
/// the requests it receives.
#[derive(Debug, Default)]
pub struct StaticStoreApi {
    state: Mutex<StaticState>,
    stock_requests: AtomicUsize,
    product_requests: AtomicUsize,
}

impl StaticStoreApi {
    /// Serve the given catalog and stock.
    pub fn new(products: Vec<Product>, stock: Vec<StockEntry>) -> Self {
        Self {
            state: Mutex::new(StaticState {
                products,
                stock,
                unavailable: false,
            }),
            ..Self::default()
        }
    }

    /// Make every request fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.unavailable = unavailable;
        }
    }

    /// Number of stock requests served so far.
    pub fn stock_requests(&self) -> usize {
        self.stock_requests.load(Ordering::SeqCst)
    }

    /// Number of catalog requests served so far.
    pub fn product_requests(&self) -> usize {
        self.product_requests.load(Ordering::SeqCst)
    }

    fn read<T>(&self, f: impl FnOnce(&StaticState) -> T) -> Result<T, FetchError> {
        let state = self
            .state
            .lock()
            .map_err(|e| FetchError::RequestError(e.to_string()))?;
        if state.unavailable {
            return Err(FetchError::RequestError("store api unavailable".to_string()));
        }
        Ok(f(&state))
    }
}

#[async_trait]
impl StoreApi for StaticStoreApi {
    async fn fetch_stock(&self) -> Result<Vec<StockEntry>, FetchError> {
        self.stock_requests.fetch_add(1, Ordering::SeqCst);
        self.read(|state| state.stock.clone())
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError> {
        self.product_requests.fetch_add(1, Ordering::SeqCst);
        self.read(|state| state.products.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_http_fetch_stock_and_products() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/stock"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id": 1, "amount": 3}, {"id": 2, "amount": 5}]"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id": 1, "title": "Tênis de Caminhada", "price": 179.9,
                     "image": "https://example.com/1.jpg"}]"#,
            ))
            .mount(&server)
            .await;

        let api = HttpStoreApi::new(server.uri());

        let stock = api.fetch_stock().await.unwrap();
        assert_eq!(stock, vec![StockEntry::new(1, 3), StockEntry::new(2, 5)]);

        let products = api.fetch_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, ProductId::new(1));
        assert_eq!(products[0].amount, 0);
    }

    #[tokio::test]
    async fn test_http_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/stock"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let api = HttpStoreApi::new(server.uri());
        let err = api.fetch_stock().await.unwrap_err();
        assert!(matches!(err, FetchError::HttpError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_static_api_counts_and_fails() {
        let api = StaticStoreApi::new(vec![Product::new(1)], vec![StockEntry::new(1, 1)]);

        assert_eq!(api.fetch_products().await.unwrap().len(), 1);
        api.set_unavailable(true);
        assert!(api.fetch_stock().await.is_err());

        assert_eq!(api.product_requests(), 1);
        assert_eq!(api.stock_requests(), 1);
    }
}

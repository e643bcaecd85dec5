//! End-to-end cart flows over HTTP and a file-backed store.

use std::path::Path;
use std::sync::Arc;

use shoes_cache::Cache;
use shoes_cart::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRODUCTS: &str = r#"[
    {"id": 1, "title": "Tênis de Caminhada Leve Confortável", "price": 179.9,
     "image": "https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis1.jpg"},
    {"id": 2, "title": "Tênis VR Caminhada Confortável Detalhes Couro Masculino", "price": 139.9,
     "image": "https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis2.jpg"}
]"#;

async fn storefront(stock: &str) -> MockServer {
    storefront_with_catalog(PRODUCTS, stock).await
}

async fn storefront_with_catalog(products: &str, stock: &str) -> MockServer {
    let server = MockServer::builder().start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string(products.to_string()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/stock"))
        .respond_with(ResponseTemplate::new(200).set_body_string(stock.to_string()))
        .mount(&server)
        .await;

    server
}

fn load(server: &MockServer, storage: &Path, notifier: &RecordingNotifier) -> CartManager {
    let api = Arc::new(HttpStoreApi::new(server.uri()));
    let cache = Cache::open_file(storage).unwrap();
    CartManager::builder(api, cache)
        .with_notifier(Arc::new(notifier.clone()))
        .load()
        .unwrap()
}

fn persisted(storage: &Path) -> Option<Cart> {
    Cache::open_file(storage).unwrap().get(DEFAULT_CART_KEY).unwrap()
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let server = storefront(r#"[{"id": 1, "amount": 3}, {"id": 2, "amount": 5}]"#).await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let notifier = RecordingNotifier::new();

    let mut manager = load(&server, &storage, &notifier);
    manager.add_product(ProductId::new(1)).await.unwrap();
    manager.add_product(ProductId::new(2)).await.unwrap();
    manager.add_product(ProductId::new(1)).await.unwrap();

    assert_eq!(persisted(&storage).as_ref(), Some(manager.cart()));
    drop(manager);

    let manager = load(&server, &storage, &notifier);
    let items: Vec<_> = manager
        .cart()
        .items()
        .iter()
        .map(|p| (p.id.get(), p.amount))
        .collect();
    assert_eq!(items, vec![(2, 1), (1, 2)]);
    assert_eq!(
        manager.cart().items()[1].title(),
        Some("Tênis de Caminhada Leve Confortável")
    );
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn test_snapshot_tracks_every_commit() {
    let server = storefront(r#"[{"id": 1, "amount": 2}, {"id": 2, "amount": 1}]"#).await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let notifier = RecordingNotifier::new();
    let mut manager = load(&server, &storage, &notifier);

    manager.add_product(ProductId::new(2)).await.unwrap();
    assert_eq!(persisted(&storage).as_ref(), Some(manager.cart()));

    manager
        .update_product_amount(UpdateProductAmount::new(2, 3))
        .await
        .unwrap();
    assert_eq!(manager.cart().get(ProductId::new(2)).unwrap().amount, 4);
    assert_eq!(persisted(&storage).as_ref(), Some(manager.cart()));

    // stock of 1 does not block the update above, but does block an add
    let err = manager.add_product(ProductId::new(2)).await.unwrap_err();
    assert!(err.is_out_of_stock());
    assert_eq!(persisted(&storage).as_ref(), Some(manager.cart()));

    manager.remove_product(ProductId::new(2)).await.unwrap();
    assert_eq!(persisted(&storage), Some(Cart::new()));

    assert_eq!(
        notifier.messages(),
        vec!["Quantidade solicitada fora de estoque"]
    );
}

#[tokio::test]
async fn test_catalog_with_mixed_price_shapes() {
    let server = storefront_with_catalog(
        r#"[{"id":1,"price":"179.90"},{"id":5,"price":139.9}]"#,
        r#"[{"id": 5, "amount": 2}]"#,
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    Cache::open_file(&storage)
        .unwrap()
        .set(DEFAULT_CART_KEY, &serde_json::json!([{"id": 1, "price": "10.00", "amount": 1}]))
        .unwrap();
    let notifier = RecordingNotifier::new();

    let mut manager = load(&server, &storage, &notifier);
    manager.add_product(ProductId::new(5)).await.unwrap();

    let items: Vec<_> = manager
        .cart()
        .items()
        .iter()
        .map(|p| (p.id.get(), p.amount))
        .collect();
    assert_eq!(items, vec![(1, 1), (5, 1)]);
    assert_eq!(manager.cart().items()[0].price(), Some(10.0));
    assert_eq!(persisted(&storage).as_ref(), Some(manager.cart()));
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn test_unreachable_api_keeps_cart() {
    let server = storefront("[]").await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let notifier = RecordingNotifier::new();

    let mut manager = load(&server, &storage, &notifier);
    drop(server);

    let err = manager.add_product(ProductId::new(1)).await.unwrap_err();
    assert!(matches!(err, CartError::Fetch(_)));
    assert!(manager.cart().is_empty());
    assert!(persisted(&storage).is_none());
    assert_eq!(notifier.messages(), vec!["Erro na adição do produto"]);
}

#[tokio::test]
async fn test_service_over_http() {
    let server = storefront(r#"[{"id": 1, "amount": 4}]"#).await;
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let notifier = RecordingNotifier::new();

    let service = CartService::spawn(load(&server, &storage, &notifier));
    let handle = service.handle();

    let results = futures::future::join_all((0..6).map(|_| handle.add_product(1u64))).await;
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 4);

    let manager = service.shutdown().await.unwrap();
    assert_eq!(manager.cart().item_count(), 4);
    assert_eq!(persisted(&storage).as_ref(), Some(manager.cart()));
    assert_eq!(notifier.notices().len(), 2);
}

//! Catalog listing.

use anyhow::{Context as _, Result};
use serde::Serialize;
use shoes_cart::api::StoreApi;
use shoes_cart::catalog::{find_stock, Product, StockEntry};

use crate::context::Context;
use crate::output::truncate;

#[derive(Debug, Serialize)]
struct CatalogRow<'a> {
    #[serde(flatten)]
    product: &'a Product,
    stock: Option<i64>,
}

/// List every catalog product with its stock level.
pub async fn run(ctx: &Context) -> Result<()> {
    let api = ctx.store_api();
    let products = api
        .fetch_products()
        .await
        .context("Failed to fetch products")?;
    let stock = api.fetch_stock().await.context("Failed to fetch stock")?;

    let rows = join(&products, &stock);

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header("Catalog");
    let widths = [6, 48, 12, 6];
    ctx.output.table_row(&["ID", "PRODUCT", "PRICE", "STOCK"], &widths);
    for row in &rows {
        let stock = row
            .stock
            .map(|amount| amount.to_string())
            .unwrap_or_else(|| "-".to_string());
        ctx.output.table_row(
            &[
                &row.product.id.to_string(),
                &truncate(&row.product.display_title(), widths[1]),
                &row.product.unit_price(ctx.config.currency).display(),
                &stock,
            ],
            &widths,
        );
    }

    Ok(())
}

fn join<'a>(products: &'a [Product], stock: &[StockEntry]) -> Vec<CatalogRow<'a>> {
    products
        .iter()
        .map(|product| CatalogRow {
            product,
            stock: find_stock(stock, product.id).map(|entry| entry.amount),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_marks_missing_stock() {
        let products = vec![Product::new(1), Product::new(2)];
        let stock = vec![StockEntry::new(2, 7)];

        let rows = join(&products, &stock);
        assert_eq!(rows[0].stock, None);
        assert_eq!(rows[1].stock, Some(7));
    }
}

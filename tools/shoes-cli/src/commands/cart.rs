//! Cart commands.

use std::future::Future;

use anyhow::Result;
use shoes_cart::cart::UpdateProductAmount;
use shoes_cart::{CartError, CartHandle};

use super::{ProductArgs, UpdateArgs};
use crate::context::Context;

/// Show the persisted cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let manager = ctx.manager()?;
    ctx.output.header("Cart");
    ctx.output.cart(manager.cart(), &manager.pricing(ctx.config.currency)?);
    Ok(())
}

/// Add one unit of a product.
pub async fn add(args: ProductArgs, ctx: &Context) -> Result<()> {
    mutate(ctx, |cart| async move { cart.add_product(args.id).await }).await?;
    ctx.output.success(&format!("Added product {}", args.id));
    show(ctx).await
}

/// Remove a product.
pub async fn remove(args: ProductArgs, ctx: &Context) -> Result<()> {
    mutate(ctx, |cart| async move { cart.remove_product(args.id).await }).await?;
    ctx.output.success(&format!("Removed product {}", args.id));
    show(ctx).await
}

/// Shift a product's quantity.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let update = UpdateProductAmount::new(args.id, args.delta);
    mutate(ctx, |cart| async move { cart.update_product_amount(update).await }).await?;
    ctx.output
        .success(&format!("Updated product {} by {:+}", args.id, args.delta));
    show(ctx).await
}

/// Clear the persisted cart.
pub async fn reset(ctx: &Context) -> Result<()> {
    let cache = ctx.open_cache()?;
    cache.delete(&ctx.config.storage.key)?;
    ctx.output.success("Cart cleared");
    Ok(())
}

/// Run one mutation through the cart service and wait for it to settle.
async fn mutate<F, Fut>(ctx: &Context, op: F) -> Result<()>
where
    F: FnOnce(CartHandle) -> Fut,
    Fut: Future<Output = Result<(), CartError>>,
{
    let service = ctx.service()?;
    let result = op(service.handle()).await;
    service.shutdown().await?;
    Ok(result?)
}

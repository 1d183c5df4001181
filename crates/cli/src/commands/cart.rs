//! Cart commands.

use vitrine_client::types::CartItem;
use vitrine_client::{ClientError, Storefront};
use vitrine_core::ProductId;

/// Load the server-held cart and display the projection.
pub async fn show(storefront: &Storefront) -> Result<(), ClientError> {
    let items = storefront.cart().load_cart().await?;
    display(&items, storefront);
    Ok(())
}

/// Add a product; the displayed cart is the server's response, verbatim.
pub async fn add(
    storefront: &Storefront,
    product: ProductId,
    quantity: u32,
) -> Result<(), ClientError> {
    let items = storefront.cart().add_item(product, quantity).await?;
    tracing::info!("Added product {product} x{quantity}");
    display(&items, storefront);
    Ok(())
}

/// Set the quantity of a product already in the cart.
pub async fn set_quantity(
    storefront: &Storefront,
    product: ProductId,
    quantity: u32,
) -> Result<(), ClientError> {
    storefront.cart().load_cart().await?;
    let items = storefront.cart().update_quantity(product, quantity).await?;
    tracing::info!("Set product {product} to x{quantity}");
    display(&items, storefront);
    Ok(())
}

/// Remove a product from the cart.
pub async fn remove(storefront: &Storefront, product: ProductId) -> Result<(), ClientError> {
    let items = storefront.cart().remove_item(product).await?;
    tracing::info!("Removed product {product}");
    display(&items, storefront);
    Ok(())
}

/// Empty the cart.
pub async fn clear(storefront: &Storefront) -> Result<(), ClientError> {
    storefront.cart().clear().await?;
    tracing::info!("Cart cleared");
    Ok(())
}

fn display(items: &[CartItem], storefront: &Storefront) {
    if items.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for item in items {
        tracing::info!(
            "  {} x{}  ({} each, subtotal {})",
            item.product.name,
            item.quantity,
            item.product.price,
            item.subtotal
        );
    }
    tracing::info!(
        "{} item(s), total {}",
        storefront.cart().item_count(),
        storefront.cart().total()
    );
}

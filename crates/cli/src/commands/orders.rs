//! Order commands.

use vitrine_client::types::Order;
use vitrine_client::{ClientError, Storefront};
use vitrine_core::{OrderId, OrderStatus};

/// Submit the server-held cart as an order.
pub async fn place(storefront: &Storefront) -> Result<(), ClientError> {
    // One-shot process: hydrate the projection before submitting
    storefront.cart().load_cart().await?;

    let order = storefront.orders().submit().await?;
    tracing::info!(
        "Order {} placed: total {} ({} line(s))",
        order.order_number,
        order.total_price,
        order.order_line_items.len()
    );
    Ok(())
}

/// Refresh and display the order history.
pub async fn list(storefront: &Storefront) -> Result<(), ClientError> {
    let orders = storefront.orders().list_orders().await?;
    if orders.is_empty() {
        tracing::info!("No orders yet");
        return Ok(());
    }

    for order in &orders {
        display(order);
    }
    Ok(())
}

/// Display one order with its lines.
pub async fn show(storefront: &Storefront, id: OrderId) -> Result<(), ClientError> {
    let order = storefront.orders().order_by_id(id).await?;
    display(&order);
    for line in &order.order_line_items {
        tracing::info!(
            "  product {} x{} at {}",
            line.product_id,
            line.quantity,
            line.price
        );
    }
    Ok(())
}

/// Transition an order's status (admin).
pub async fn set_status(
    storefront: &Storefront,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), ClientError> {
    let order = storefront.orders().set_order_status(id, status).await?;
    tracing::info!("Order {} is now {}", order.order_number, order.status);
    Ok(())
}

fn display(order: &Order) {
    tracing::info!(
        "#{} {}  {}  total {}  placed {}",
        order.id,
        order.order_number,
        order.status,
        order.total_price,
        order.order_date.format("%Y-%m-%d %H:%M")
    );
}

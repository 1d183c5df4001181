//! Product catalog commands.

use rust_decimal::Decimal;

use vitrine_client::types::{ProductRequest, ProductSummary};
use vitrine_client::{ClientError, Storefront};
use vitrine_core::{CategoryId, ProductId};

/// List the catalog.
pub async fn list(storefront: &Storefront) -> Result<(), ClientError> {
    let products = storefront.products().list().await?;
    if products.is_empty() {
        tracing::info!("No products in the catalog");
        return Ok(());
    }

    for product in &products {
        display(product);
    }
    Ok(())
}

/// Show one product.
pub async fn show(storefront: &Storefront, id: ProductId) -> Result<(), ClientError> {
    let product = storefront.products().product(id).await?;
    display(&product);
    if let Some(url) = &product.image_url {
        tracing::info!("  image: {url}");
    }
    Ok(())
}

/// List the categories.
pub async fn categories(storefront: &Storefront) -> Result<(), ClientError> {
    for category in storefront.products().categories().await? {
        tracing::info!("#{} {}", category.id, category.name);
    }
    Ok(())
}

/// Product service health check.
pub async fn status(storefront: &Storefront) -> Result<(), ClientError> {
    let status = storefront.products().service_status().await?;
    tracing::info!("Product service: {status}");
    Ok(())
}

/// Create a product (admin).
#[allow(clippy::too_many_arguments)]
pub async fn create(
    storefront: &Storefront,
    name: String,
    description: String,
    price: Decimal,
    stock: u32,
    manufacturer: String,
    category: CategoryId,
    image_url: Option<String>,
) -> Result<(), ClientError> {
    let product = storefront
        .products()
        .create(&ProductRequest {
            name,
            description,
            price,
            stock_quantity: stock,
            image_url,
            manufacturer,
            category_id: category,
        })
        .await?;

    tracing::info!("Created product #{}: {}", product.id, product.name);
    Ok(())
}

/// Delete a product (admin).
pub async fn delete(storefront: &Storefront, id: ProductId) -> Result<(), ClientError> {
    storefront.products().delete(id).await?;
    tracing::info!("Deleted product #{id}");
    Ok(())
}

fn display(product: &ProductSummary) {
    let category = product
        .category
        .as_ref()
        .map_or("uncategorized", |c| c.name.as_str());
    tracing::info!(
        "#{} {}  {}  (stock: {}, {} / {})",
        product.id,
        product.name,
        product.price,
        product.stock_quantity,
        product.manufacturer,
        category
    );
}

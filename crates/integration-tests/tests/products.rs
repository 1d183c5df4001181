//! End-to-end catalog behavior, including the in-session read cache.

use rust_decimal::Decimal;

use vitrine_client::types::ProductRequest;
use vitrine_core::{CategoryId, ProductId};
use vitrine_integration_tests::TestContext;

#[tokio::test]
async fn catalog_reads_work_anonymously() {
    let ctx = TestContext::new().await;

    let products = ctx.storefront.products().list().await.unwrap();
    assert_eq!(products.len(), 3);

    let product = ctx
        .storefront
        .products()
        .product(ProductId::new(5))
        .await
        .unwrap();
    assert_eq!(product.name, "Mechanical Keyboard");
    assert_eq!(product.stock_quantity, 10);
    assert_eq!(
        product.category.unwrap().name,
        "Peripherals"
    );
}

#[tokio::test]
async fn second_list_is_served_from_the_cache() {
    let ctx = TestContext::new().await;

    ctx.storefront.products().list().await.unwrap();
    ctx.storefront.products().list().await.unwrap();

    assert_eq!(ctx.gateway.hits().product_list, 1);
}

#[tokio::test]
async fn creating_a_product_invalidates_the_list_cache() {
    let ctx = TestContext::new().await;
    ctx.login_admin().await;

    assert_eq!(ctx.storefront.products().list().await.unwrap().len(), 3);

    ctx.storefront
        .products()
        .create(&ProductRequest {
            name: "Wrist Rest".to_owned(),
            description: "Memory foam".to_owned(),
            price: Decimal::new(1250, 2),
            stock_quantity: 20,
            image_url: None,
            manufacturer: "MatWorks".to_owned(),
            category_id: CategoryId::new(4),
        })
        .await
        .unwrap();

    let products = ctx.storefront.products().list().await.unwrap();
    assert_eq!(products.len(), 4);
    assert_eq!(ctx.gateway.hits().product_list, 2);
}

#[tokio::test]
async fn updating_a_product_invalidates_its_cache_entry() {
    let ctx = TestContext::new().await;
    ctx.login_admin().await;
    let catalog = ctx.storefront.products();

    let before = catalog.product(ProductId::new(5)).await.unwrap();
    assert_eq!(before.price, Decimal::new(100, 1));

    catalog
        .update(
            ProductId::new(5),
            &ProductRequest {
                name: before.name.clone(),
                description: String::new(),
                price: Decimal::new(1500, 2),
                stock_quantity: before.stock_quantity,
                image_url: None,
                manufacturer: before.manufacturer.clone(),
                category_id: CategoryId::new(2),
            },
        )
        .await
        .unwrap();

    // A cached read would still answer 10.0
    let after = catalog.product(ProductId::new(5)).await.unwrap();
    assert_eq!(after.price, Decimal::new(1500, 2));
}

#[tokio::test]
async fn deleting_a_product_removes_it_from_the_catalog() {
    let ctx = TestContext::new().await;
    ctx.login_admin().await;

    ctx.storefront
        .products()
        .delete(ProductId::new(3))
        .await
        .unwrap();

    let products = ctx.storefront.products().list().await.unwrap();
    assert!(products.iter().all(|p| p.id != ProductId::new(3)));
}

#[tokio::test]
async fn categories_and_service_status() {
    let ctx = TestContext::new().await;

    let categories = ctx.storefront.products().categories().await.unwrap();
    assert_eq!(categories.len(), 2);

    let status = ctx.storefront.products().service_status().await.unwrap();
    assert_eq!(status, "Product service is up");
}

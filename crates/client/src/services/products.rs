//! Product service client.
//!
//! Catalog reads are cached in-memory for the session (5-minute TTL);
//! administrative mutations invalidate the affected entries. The cart and
//! order services are never cached - their state is mutable.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::Method;
use tracing::{debug, instrument};

use vitrine_core::ProductId;

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::types::{CategorySummary, ProductRequest, ProductSummary};

const PRODUCTS_PATH: &str = "/PRODUCT-SERVICE/products";
const CATEGORIES_PATH: &str = "/PRODUCT-SERVICE/categories";

#[derive(Clone)]
enum CacheValue {
    Product(Box<ProductSummary>),
    Products(Vec<ProductSummary>),
    Categories(Vec<CategorySummary>),
}

/// Client for the product and category catalog.
#[derive(Clone)]
pub struct ProductCatalog {
    inner: Arc<ProductCatalogInner>,
}

struct ProductCatalogInner {
    gateway: Gateway,
    cache: Cache<String, CacheValue>,
}

impl ProductCatalog {
    pub(crate) fn new(gateway: Gateway) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(ProductCatalogInner { gateway, cache }),
        }
    }

    /// Health check of the product service; returns its status line.
    ///
    /// # Errors
    ///
    /// Returns an error if the product service is unreachable or failing.
    pub async fn service_status(&self) -> Result<String, ClientError> {
        let gateway = &self.inner.gateway;
        gateway
            .send_text(gateway.request(Method::GET, &format!("{PRODUCTS_PATH}/status")))
            .await
    }

    /// All products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the product service rejects or fails the request.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ProductSummary>, ClientError> {
        let cache_key = "products".to_owned();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let gateway = &self.inner.gateway;
        let products: Vec<ProductSummary> = gateway
            .send_json(gateway.request(Method::GET, PRODUCTS_PATH))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// One product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<ProductSummary, ClientError> {
        let cache_key = product_key(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let gateway = &self.inner.gateway;
        let product: ProductSummary = gateway
            .send_json(gateway.request(Method::GET, &format!("{PRODUCTS_PATH}/{id}")))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// All product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the product service rejects or fails the request.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<CategorySummary>, ClientError> {
        let cache_key = "categories".to_owned();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let gateway = &self.inner.gateway;
        let categories: Vec<CategorySummary> = gateway
            .send_json(gateway.request(Method::GET, CATEGORIES_PATH))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Create a product (administrative).
    ///
    /// # Errors
    ///
    /// Returns an error if the product service rejects the record.
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: &ProductRequest) -> Result<ProductSummary, ClientError> {
        let gateway = &self.inner.gateway;
        let builder = gateway.request(Method::POST, PRODUCTS_PATH).json(request);
        let product: ProductSummary = gateway.send_json(builder).await?;

        self.inner.cache.invalidate("products").await;
        Ok(product)
    }

    /// Replace a product (administrative).
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the update is
    /// rejected.
    #[instrument(skip(self, request), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: ProductId,
        request: &ProductRequest,
    ) -> Result<ProductSummary, ClientError> {
        let gateway = &self.inner.gateway;
        let builder = gateway
            .request(Method::PUT, &format!("{PRODUCTS_PATH}/{id}"))
            .json(request);
        let product: ProductSummary = gateway.send_json(builder).await?;

        self.inner.cache.invalidate("products").await;
        self.inner.cache.invalidate(&product_key(id)).await;
        Ok(product)
    }

    /// Delete a product (administrative).
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the delete is
    /// rejected.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), ClientError> {
        let gateway = &self.inner.gateway;
        gateway
            .send_unit(gateway.request(Method::DELETE, &format!("{PRODUCTS_PATH}/{id}")))
            .await?;

        self.inner.cache.invalidate("products").await;
        self.inner.cache.invalidate(&product_key(id)).await;
        Ok(())
    }
}

fn product_key(id: ProductId) -> String {
    format!("product:{id}")
}

//! Cart service client and the local cart projection.
//!
//! The cart service is the sole source of truth. Every mutation is a round
//! trip, and on success the entire local projection is replaced with the
//! item sequence from the response - never merged, patched, or appended
//! locally. On failure the projection is left untouched and the error is
//! surfaced; the cart is not optimistically guessed.
//!
//! Overlapping mutations are resolved by sequence number: each call that
//! can replace the projection takes a monotonically increasing sequence
//! before its request goes out, and a response is applied only if it is
//! newer than the last applied one. A slow early response can therefore
//! never clobber the projection a later call already installed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Method;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use vitrine_core::{CartId, CartItemId, ProductId, UserId};

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::session::Session;
use crate::store::{Store, Subscription};
use crate::types::{CartItem, ProductSummary};

const CART_PATH: &str = "/COMMANDE-SERVICE/api/cart";
const CART_ITEMS_PATH: &str = "/COMMANDE-SERVICE/api/cart/items";

// =============================================================================
// Wire shapes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartResponse {
    #[allow(dead_code)]
    id: CartId,
    #[allow(dead_code)]
    user_id: UserId,
    items: Vec<CartItemResponse>,
    // The projection total is derived from the item subtotals; this field
    // is the same number and is not stored separately.
    #[allow(dead_code)]
    total_price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartItemResponse {
    #[allow(dead_code)]
    id: CartItemId,
    product_id: ProductId,
    product_name: String,
    #[serde(default)]
    product_image_url: Option<String>,
    price: Decimal,
    quantity: u32,
    subtotal: Decimal,
}

impl CartItemResponse {
    /// The cart service returns only a slice of the product record; the
    /// missing fields are defaulted, matching what the catalog would later
    /// fill in on a product page.
    fn into_item(self) -> CartItem {
        CartItem {
            product: ProductSummary {
                id: self.product_id,
                name: self.product_name,
                price: self.price,
                image_url: self.product_image_url,
                stock_quantity: 0,
                manufacturer: String::new(),
                category: None,
                created_at: None,
                updated_at: None,
            },
            quantity: self.quantity,
            subtotal: self.subtotal,
        }
    }
}

impl CartResponse {
    fn into_items(self) -> Vec<CartItem> {
        self.items
            .into_iter()
            .map(CartItemResponse::into_item)
            .collect()
    }
}

// =============================================================================
// CartSynchronizer
// =============================================================================

/// Owns the locally projected, server-authoritative cart.
#[derive(Clone)]
pub struct CartSynchronizer {
    inner: Arc<CartSynchronizerInner>,
}

struct CartSynchronizerInner {
    gateway: Gateway,
    session: Store<Session>,
    items: Store<Vec<CartItem>>,
    next_seq: AtomicU64,
    applied_seq: std::sync::Mutex<u64>,
}

impl CartSynchronizer {
    pub(crate) fn new(gateway: Gateway, session: Store<Session>) -> Self {
        Self {
            inner: Arc::new(CartSynchronizerInner {
                gateway,
                session,
                items: Store::new(Vec::new()),
                next_seq: AtomicU64::new(0),
                applied_seq: std::sync::Mutex::new(0),
            }),
        }
    }

    // =========================================================================
    // Mutations (round trips; projection replaced wholesale)
    // =========================================================================

    /// Fetch the cart from the server and replace the projection.
    ///
    /// Without an authenticated session the projection simply becomes empty
    /// and no request is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart service rejects or fails the request;
    /// the projection is left untouched in that case.
    #[instrument(skip(self))]
    pub async fn load_cart(&self) -> Result<Vec<CartItem>, ClientError> {
        let seq = self.take_seq();
        if !self.is_logged_in() {
            self.apply(seq, Vec::new());
            return Ok(Vec::new());
        }

        let gateway = &self.inner.gateway;
        let response: CartResponse = gateway
            .send_json(gateway.request(Method::GET, CART_PATH))
            .await?;
        self.apply(seq, response.into_items());
        Ok(self.items())
    }

    /// Add `quantity` of a product to the cart.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidQuantity`] when `quantity` is 0.
    /// - [`ClientError::NotAuthenticated`] when no session is authenticated;
    ///   nothing is sent and the projection is untouched.
    /// - Any cart-service error, with the projection untouched.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Vec<CartItem>, ClientError> {
        self.mutate_items(Method::POST, product_id, quantity).await
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// Setting a quantity of 0 is rejected; removal goes through
    /// [`Self::remove_item`].
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::add_item`].
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Vec<CartItem>, ClientError> {
        self.mutate_items(Method::PUT, product_id, quantity).await
    }

    async fn mutate_items(
        &self,
        method: Method,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Vec<CartItem>, ClientError> {
        if quantity == 0 {
            return Err(ClientError::InvalidQuantity);
        }
        if !self.is_logged_in() {
            tracing::warn!(%product_id, "cart mutation refused: not authenticated");
            return Err(ClientError::NotAuthenticated);
        }

        let seq = self.take_seq();
        let gateway = &self.inner.gateway;
        let builder = gateway.request(method, CART_ITEMS_PATH).query(&[
            ("productId", product_id.to_string()),
            ("quantity", quantity.to_string()),
        ]);
        let response: CartResponse = gateway.send_json(builder).await?;

        self.apply(seq, response.into_items());
        Ok(self.items())
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`] when no session is authenticated;
    /// otherwise any cart-service error, with the projection untouched.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: ProductId) -> Result<Vec<CartItem>, ClientError> {
        if !self.is_logged_in() {
            tracing::warn!(%product_id, "cart removal refused: not authenticated");
            return Err(ClientError::NotAuthenticated);
        }

        let seq = self.take_seq();
        let gateway = &self.inner.gateway;
        let response: CartResponse = gateway
            .send_json(gateway.request(Method::DELETE, &format!("{CART_ITEMS_PATH}/{product_id}")))
            .await?;

        self.apply(seq, response.into_items());
        Ok(self.items())
    }

    /// Empty the cart.
    ///
    /// Unauthenticated calls just drop the local projection; authenticated
    /// calls clear the server-held cart first.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart service fails the request; the
    /// projection is left untouched in that case.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ClientError> {
        let seq = self.take_seq();
        if !self.is_logged_in() {
            self.apply(seq, Vec::new());
            return Ok(());
        }

        let gateway = &self.inner.gateway;
        gateway
            .send_unit(gateway.request(Method::DELETE, CART_PATH))
            .await?;
        self.apply(seq, Vec::new());
        Ok(())
    }

    /// Install a projection directly, bypassing the server round trip.
    #[cfg(test)]
    pub(crate) fn seed(&self, items: Vec<CartItem>) {
        let seq = self.take_seq();
        self.apply(seq, items);
    }

    /// Drop the local projection without touching the server.
    ///
    /// Used when the session ends: the server-held cart still belongs to
    /// the user who logged out.
    pub fn clear_local(&self) {
        let seq = self.take_seq();
        self.apply(seq, Vec::new());
    }

    // =========================================================================
    // Derived reads (projection only; never trigger I/O)
    // =========================================================================

    /// Clone of the current projection.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.inner.items.get()
    }

    /// Sum of quantities across the projection.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.inner
            .items
            .with(|items| items.iter().map(|i| i.quantity).sum())
    }

    /// Sum of server-computed subtotals across the projection.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.inner
            .items
            .with(|items| items.iter().map(|i| i.subtotal).sum())
    }

    /// Whether the projection holds the given product.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.inner
            .items
            .with(|items| items.iter().any(|i| i.product.id == product_id))
    }

    /// Projected quantity of the given product; 0 when absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.inner.items.with(|items| {
            items
                .iter()
                .find(|i| i.product.id == product_id)
                .map_or(0, |i| i.quantity)
        })
    }

    /// Read-only subscription to projection replacements.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<Vec<CartItem>> {
        self.inner.items.subscribe()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn is_logged_in(&self) -> bool {
        self.inner.session.with(|s| s.is_authenticated)
    }

    /// Sequence number for a projection-replacing call, taken before the
    /// request goes out so responses can be ordered by request order.
    fn take_seq(&self) -> u64 {
        self.inner.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Install a projection if it is newer than the last applied one.
    fn apply(&self, seq: u64, items: Vec<CartItem>) -> bool {
        let mut applied = self
            .inner
            .applied_seq
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if seq <= *applied {
            tracing::debug!(seq, last_applied = *applied, "discarding stale cart response");
            return false;
        }

        *applied = seq;
        self.inner.items.publish(items);
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::config::ClientConfig;
    use crate::credentials::CredentialStore;
    use crate::types::User;

    fn item(product_id: i64, quantity: u32, subtotal: Decimal) -> CartItem {
        CartItem {
            product: ProductSummary {
                id: ProductId::new(product_id),
                name: format!("product-{product_id}"),
                price: Decimal::ZERO,
                image_url: None,
                stock_quantity: 0,
                manufacturer: String::new(),
                category: None,
                created_at: None,
                updated_at: None,
            },
            quantity,
            subtotal,
        }
    }

    /// Synchronizer wired to an unreachable gateway: an attempted request
    /// surfaces as a transport error, which the tests use to prove that a
    /// guard fired before any network work.
    fn test_sync(dir: &tempfile::TempDir) -> (CartSynchronizer, Store<Session>) {
        let credentials =
            CredentialStore::open(dir.path().join("credentials.json")).unwrap();
        let session = Store::new(Session::unauthenticated());
        let navigation = Store::new(None);

        let config = ClientConfig {
            api_url: "http://127.0.0.1:9".parse().unwrap(),
            credentials_path: PathBuf::from("unused"),
            request_timeout: Duration::from_secs(1),
            order_banner_window: Duration::from_secs(5),
        };
        let gateway =
            Gateway::new(&config, credentials, session.clone(), navigation).unwrap();

        (CartSynchronizer::new(gateway, session.clone()), session)
    }

    fn authenticated_session() -> Session {
        Session::authenticated(User {
            id: UserId::new(7),
            username: "a@b.com".to_owned(),
            email: None,
            first_name: None,
            last_name: None,
            roles: vec!["USER".to_owned()],
            permissions: None,
        })
    }

    #[test]
    fn test_wire_item_maps_to_projection_item() {
        let json = r#"{
            "id": 1,
            "productId": 5,
            "productName": "Mechanical Keyboard",
            "productImageUrl": "https://cdn.example.com/kb.png",
            "price": 10.0,
            "quantity": 3,
            "subtotal": 30.0
        }"#;
        let wire: CartItemResponse = serde_json::from_str(json).unwrap();
        let item = wire.into_item();

        assert_eq!(item.product.id, ProductId::new(5));
        assert_eq!(item.quantity, 3);
        assert_eq!(item.subtotal, Decimal::new(300, 1));
        // Fields the cart service does not return are defaulted
        assert_eq!(item.product.stock_quantity, 0);
        assert!(item.product.category.is_none());
    }

    #[tokio::test]
    async fn test_add_item_unauthenticated_is_rejected_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, _session) = test_sync(&dir);

        // A transport error here would mean a request was attempted against
        // the dead gateway.
        let err = sync.add_item(ProductId::new(5), 2).await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
        assert!(sync.items().is_empty());
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, session) = test_sync(&dir);
        session.publish(authenticated_session());

        let err = sync.add_item(ProductId::new(5), 0).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidQuantity));

        let err = sync.update_quantity(ProductId::new(5), 0).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidQuantity));
    }

    #[tokio::test]
    async fn test_load_cart_unauthenticated_empties_projection() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, _session) = test_sync(&dir);

        sync.apply(sync.take_seq(), vec![item(5, 3, Decimal::new(300, 1))]);
        let items = sync.load_cart().await.unwrap();
        assert!(items.is_empty());
        assert!(sync.items().is_empty());
    }

    #[tokio::test]
    async fn test_clear_unauthenticated_empties_projection_locally() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, _session) = test_sync(&dir);

        sync.apply(sync.take_seq(), vec![item(5, 3, Decimal::new(300, 1))]);
        sync.clear().await.unwrap();
        assert!(sync.items().is_empty());
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_projection_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, session) = test_sync(&dir);
        session.publish(authenticated_session());

        let before = vec![item(5, 3, Decimal::new(300, 1))];
        sync.apply(sync.take_seq(), before.clone());

        // The gateway is unreachable, so the round trip fails
        let err = sync.add_item(ProductId::new(9), 1).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(sync.items(), before);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, _session) = test_sync(&dir);

        // Two calls take their sequence numbers in request order...
        let first = sync.take_seq();
        let second = sync.take_seq();

        // ...but the second response arrives first
        assert!(sync.apply(second, vec![item(9, 1, Decimal::ONE)]));
        assert!(!sync.apply(first, vec![item(5, 3, Decimal::new(300, 1))]));

        // The projection equals the newest response, not the last to arrive
        assert_eq!(sync.items(), vec![item(9, 1, Decimal::ONE)]);
    }

    #[tokio::test]
    async fn test_in_order_responses_each_replace_projection() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, _session) = test_sync(&dir);

        for round in 1..=3_i64 {
            let items = vec![item(round, u32::try_from(round).unwrap(), Decimal::from(round))];
            assert!(sync.apply(sync.take_seq(), items.clone()));
            assert_eq!(sync.items(), items);
        }
    }

    #[tokio::test]
    async fn test_derived_reads() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, _session) = test_sync(&dir);

        sync.apply(
            sync.take_seq(),
            vec![
                item(5, 3, Decimal::new(300, 1)),
                item(9, 2, Decimal::new(55, 1)),
            ],
        );

        assert_eq!(sync.item_count(), 5);
        assert_eq!(sync.total(), Decimal::new(355, 1));
        assert!(sync.contains(ProductId::new(5)));
        assert!(!sync.contains(ProductId::new(6)));
        assert_eq!(sync.quantity_of(ProductId::new(9)), 2);
        assert_eq!(sync.quantity_of(ProductId::new(6)), 0);
    }
}

//! Order service client and the submission pipeline.
//!
//! Submission is a small state machine: `Idle -> Submitting -> {Succeeded,
//! Failed}`, then back to `Idle` after a fixed observation window so the
//! presentation layer can clear its banner on a timer instead of an event.
//! A successful submission consumes the cart: the new order is prepended to
//! the locally held history and the cart is cleared. A failed submission
//! leaves the cart exactly as it was.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use vitrine_core::{OrderId, OrderStatus, ProductId};

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::services::cart::CartSynchronizer;
use crate::store::{Store, Subscription};
use crate::types::Order;

const ORDERS_PATH: &str = "/COMMANDE-SERVICE/api/orders";

// Fixed, user-facing messages per failure class of the order service.
const ORDER_VALIDATION_MSG: &str =
    "Cart validation failed (empty cart, unavailable product, or insufficient stock).";
const ORDER_NOT_FOUND_MSG: &str = "Order not found.";
const ORDER_SERVER_MSG: &str = "Order service unavailable. Please try again later.";

// =============================================================================
// Wire shapes
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderRequest {
    order_line_items_dto_list: Vec<OrderLineRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderLineRequest {
    product_id: ProductId,
    quantity: u32,
}

// =============================================================================
// Submission state
// =============================================================================

/// Observable state of the submission pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// An order-creation request is in flight.
    Submitting,
    /// The last submission produced this order; auto-clears after the
    /// observation window.
    Succeeded(Box<Order>),
    /// The last submission failed with this user-facing message;
    /// auto-clears after the observation window.
    Failed(String),
}

// =============================================================================
// OrderSubmissionPipeline
// =============================================================================

/// Converts the cart projection into a persisted order and owns the locally
/// held order history.
#[derive(Clone)]
pub struct OrderSubmissionPipeline {
    inner: Arc<OrderPipelineInner>,
}

struct OrderPipelineInner {
    gateway: Gateway,
    cart: CartSynchronizer,
    orders: Store<Vec<Order>>,
    state: Store<SubmissionState>,
    // Bumped on every state transition so a pending timed reset from an
    // earlier submission cannot wipe a newer state.
    generation: AtomicU64,
    observation_window: Duration,
}

impl OrderSubmissionPipeline {
    pub(crate) fn new(
        gateway: Gateway,
        cart: CartSynchronizer,
        observation_window: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(OrderPipelineInner {
                gateway,
                cart,
                orders: Store::new(Vec::new()),
                state: Store::new(SubmissionState::Idle),
                generation: AtomicU64::new(0),
                observation_window,
            }),
        }
    }

    /// Submit the current cart projection as a new order.
    ///
    /// On success the order is prepended to the local history (most recent
    /// first is a display convention, not a server guarantee) and the cart
    /// is cleared. On failure the cart is left untouched.
    ///
    /// # Errors
    ///
    /// - [`ClientError::EmptyCart`] when the projection is empty; raised
    ///   before any request is sent.
    /// - Order-service failures, translated to their fixed user-facing
    ///   messages.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<Order, ClientError> {
        let lines: Vec<OrderLineRequest> = self
            .inner
            .cart
            .items()
            .into_iter()
            .map(|item| OrderLineRequest {
                product_id: item.product.id,
                quantity: item.quantity,
            })
            .collect();

        if lines.is_empty() {
            return Err(ClientError::EmptyCart);
        }

        self.advance(SubmissionState::Submitting);

        let gateway = &self.inner.gateway;
        let builder = gateway.request(Method::POST, ORDERS_PATH).json(&OrderRequest {
            order_line_items_dto_list: lines,
        });

        match gateway.send_json::<Order>(builder).await {
            Ok(order) => {
                tracing::info!(order_number = %order.order_number, "order placed");

                let mut history = self.inner.orders.get();
                history.insert(0, order.clone());
                self.inner.orders.publish(history);

                // The server already consumed the cart into the order; a
                // failed clear only leaves a stale projection behind.
                if let Err(e) = self.inner.cart.clear().await {
                    tracing::warn!(error = %e, "cart clear after order placement failed");
                }

                let generation = self.advance(SubmissionState::Succeeded(Box::new(order.clone())));
                self.arm_reset(generation);
                Ok(order)
            }
            Err(e) => {
                let err = map_order_error(e);
                let generation = self.advance(SubmissionState::Failed(err.to_string()));
                self.arm_reset(generation);
                Err(err)
            }
        }
    }

    /// Full refresh of the order history from the order service.
    ///
    /// # Errors
    ///
    /// Order-service failures, translated to their fixed user-facing
    /// messages; the local history is left untouched on failure.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ClientError> {
        let gateway = &self.inner.gateway;
        let orders: Vec<Order> = gateway
            .send_json(gateway.request(Method::GET, ORDERS_PATH))
            .await
            .map_err(map_order_error)?;

        self.inner.orders.publish(orders.clone());
        Ok(orders)
    }

    /// One order by id.
    ///
    /// # Errors
    ///
    /// `Order not found.` for unknown ids; other order-service failures
    /// translated to their fixed messages.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order_by_id(&self, id: OrderId) -> Result<Order, ClientError> {
        let gateway = &self.inner.gateway;
        gateway
            .send_json(gateway.request(Method::GET, &format!("{ORDERS_PATH}/{id}")))
            .await
            .map_err(map_order_error)
    }

    /// Transition an order's status (administrative).
    ///
    /// The server decides the outcome; the matching entry in the local
    /// history is replaced with the returned order, never predicted.
    /// Two administrators racing on the same order id still resolve to
    /// last-write-wins with no conflict detection.
    ///
    /// # Errors
    ///
    /// `Order not found.` for unknown ids; other order-service failures
    /// translated to their fixed messages.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ClientError> {
        let gateway = &self.inner.gateway;
        let builder = gateway
            .request(Method::PUT, &format!("{ORDERS_PATH}/{id}/status"))
            .json(&status);
        let order: Order = gateway.send_json(builder).await.map_err(map_order_error)?;

        let mut history = self.inner.orders.get();
        if let Some(slot) = history.iter_mut().find(|o| o.id == order.id) {
            *slot = order.clone();
            self.inner.orders.publish(history);
        }
        Ok(order)
    }

    /// Clone of the locally held order history.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.inner.orders.get()
    }

    /// Read-only subscription to history replacements.
    #[must_use]
    pub fn subscribe_orders(&self) -> Subscription<Vec<Order>> {
        self.inner.orders.subscribe()
    }

    /// Latest published submission state.
    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.inner.state.get()
    }

    /// Read-only subscription to submission-state transitions.
    #[must_use]
    pub fn subscribe_state(&self) -> Subscription<SubmissionState> {
        self.inner.state.subscribe()
    }

    /// Publish a state and invalidate any pending timed reset.
    fn advance(&self, state: SubmissionState) -> u64 {
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.state.publish(state);
        generation
    }

    /// After the observation window, return to idle - unless a newer
    /// transition happened in the meantime.
    fn arm_reset(&self, generation: u64) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.observation_window).await;
            if inner.generation.load(Ordering::Relaxed) == generation {
                inner.state.publish(SubmissionState::Idle);
            }
        });
    }
}

fn map_order_error(err: ClientError) -> ClientError {
    match err {
        ClientError::Validation(_) => ClientError::Validation(ORDER_VALIDATION_MSG.to_owned()),
        ClientError::NotFound(_) => ClientError::NotFound(ORDER_NOT_FOUND_MSG.to_owned()),
        ClientError::Server(_) => ClientError::Server(ORDER_SERVER_MSG.to_owned()),
        other => other,
    }
}

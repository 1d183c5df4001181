//! Integration tests for Vitrine.
//!
//! The engine is exercised end-to-end against an in-process fake gateway:
//! an axum server bound to a random local port that implements the backend
//! contract (auth, user, product, cart, and order services) over in-memory
//! state. Each test gets its own gateway, its own credential file, and its
//! own [`Storefront`].
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)] // test infrastructure

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use vitrine_client::{ClientConfig, Storefront};
use vitrine_core::Email;

// =============================================================================
// Fake backend state
// =============================================================================

/// A seeded account on the fake auth/user services.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
}

/// A seeded product on the fake product service.
#[derive(Debug, Clone)]
pub struct TestProduct {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    pub manufacturer: String,
    pub category_id: i64,
    pub category_name: String,
}

#[derive(Debug, Clone)]
struct CartLine {
    product_id: i64,
    quantity: u32,
}

/// Request counters, used to assert that an operation did or did not reach
/// the backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct Hits {
    pub product_list: usize,
    pub cart_get: usize,
    pub cart_mutations: usize,
    pub order_create: usize,
}

/// Mutable state behind the fake gateway.
pub struct GatewayState {
    users: HashMap<i64, TestUser>,
    tokens: HashMap<String, i64>,
    issued_tokens: u64,
    products: BTreeMap<i64, TestProduct>,
    carts: HashMap<i64, Vec<CartLine>>,
    orders: Vec<Value>,
    next_order_id: i64,
    pub hits: Hits,
}

impl GatewayState {
    fn seeded() -> Self {
        let mut users = HashMap::new();
        users.insert(
            7,
            TestUser {
                id: 7,
                email: "a@b.com".to_owned(),
                password: "x".to_owned(),
                role: "ADMIN".to_owned(),
                first_name: "Ada".to_owned(),
                last_name: "Lovelace".to_owned(),
            },
        );
        users.insert(
            8,
            TestUser {
                id: 8,
                email: "shopper@example.com".to_owned(),
                password: "secret".to_owned(),
                role: "USER".to_owned(),
                first_name: "Sam".to_owned(),
                last_name: "Shopper".to_owned(),
            },
        );

        let mut products = BTreeMap::new();
        products.insert(
            5,
            TestProduct {
                id: 5,
                name: "Mechanical Keyboard".to_owned(),
                price: Decimal::new(100, 1), // 10.0
                stock: 10,
                manufacturer: "KeyCo".to_owned(),
                category_id: 2,
                category_name: "Peripherals".to_owned(),
            },
        );
        products.insert(
            9,
            TestProduct {
                id: 9,
                name: "Vertical Mouse".to_owned(),
                price: Decimal::new(275, 2), // 2.75
                stock: 5,
                manufacturer: "KeyCo".to_owned(),
                category_id: 2,
                category_name: "Peripherals".to_owned(),
            },
        );
        products.insert(
            3,
            TestProduct {
                id: 3,
                name: "Limited Edition Desk Mat".to_owned(),
                price: Decimal::new(500, 1), // 50.0
                stock: 1,
                manufacturer: "MatWorks".to_owned(),
                category_id: 4,
                category_name: "Accessories".to_owned(),
            },
        );

        Self {
            users,
            tokens: HashMap::new(),
            issued_tokens: 0,
            products,
            carts: HashMap::new(),
            orders: Vec::new(),
            next_order_id: 11,
            hits: Hits::default(),
        }
    }

    fn issue_token(&mut self, user_id: i64) -> String {
        self.issued_tokens += 1;
        let token = format!("T{}", self.issued_tokens);
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn user_for_token(&self, headers: &HeaderMap) -> Option<i64> {
        let header = headers.get("authorization")?.to_str().ok()?;
        let token = header.strip_prefix("Bearer ")?;
        self.tokens.get(token).copied()
    }

    fn cart_json(&self, user_id: i64) -> Value {
        let lines = self.carts.get(&user_id).cloned().unwrap_or_default();
        let mut total = Decimal::ZERO;
        let items: Vec<Value> = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let product = &self.products[&line.product_id];
                let subtotal = product.price * Decimal::from(line.quantity);
                total += subtotal;
                json!({
                    "id": index as i64 + 1,
                    "productId": product.id,
                    "productName": product.name,
                    "productImageUrl": null,
                    "price": product.price,
                    "quantity": line.quantity,
                    "subtotal": subtotal,
                })
            })
            .collect();

        json!({ "id": user_id, "userId": user_id, "items": items, "totalPrice": total })
    }

    fn product_json(product: &TestProduct) -> Value {
        json!({
            "id": product.id,
            "name": product.name,
            "price": product.price,
            "stockQuantity": product.stock,
            "imageUrl": null,
            "manufacturer": product.manufacturer,
            "productCategory": { "id": product.category_id, "name": product.category_name },
        })
    }

    fn user_json(user: &TestUser) -> Value {
        json!({
            "id": user.id,
            "firstName": user.first_name,
            "lastName": user.last_name,
            "email": user.email,
            "role": user.role,
            "shippingAddress": null,
            "phone": null,
            "createdAt": "2024-01-01T00:00:00Z",
        })
    }
}

type SharedState = Arc<Mutex<GatewayState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, GatewayState> {
    state.lock().unwrap()
}

// =============================================================================
// Fake gateway server
// =============================================================================

/// An in-process gateway serving the full backend contract.
pub struct FakeGateway {
    state: SharedState,
    addr: SocketAddr,
}

impl FakeGateway {
    /// Bind to a random local port and start serving.
    pub async fn spawn() -> Self {
        let state: SharedState = Arc::new(Mutex::new(GatewayState::seeded()));

        let app = Router::new()
            // Auth service
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/logout", post(logout))
            // User service
            .route(
                "/MS-CLIENT/api/v1/users",
                get(list_users).post(create_user_record),
            )
            .route("/MS-CLIENT/api/v1/users/email/{email}", get(get_user_by_email))
            .route(
                "/MS-CLIENT/api/v1/users/{id}",
                get(get_user).put(update_user).delete(delete_user),
            )
            .route("/MS-CLIENT/api/v1/users/{id}/role", put(set_user_role))
            // Cart service
            .route("/COMMANDE-SERVICE/api/cart", get(get_cart).delete(clear_cart))
            .route(
                "/COMMANDE-SERVICE/api/cart/items",
                post(add_cart_item).put(update_cart_item),
            )
            .route(
                "/COMMANDE-SERVICE/api/cart/items/{product_id}",
                axum::routing::delete(remove_cart_item),
            )
            // Order service
            .route("/COMMANDE-SERVICE/api/orders", post(create_order).get(list_orders))
            .route("/COMMANDE-SERVICE/api/orders/{id}", get(get_order))
            .route("/COMMANDE-SERVICE/api/orders/{id}/status", put(set_order_status))
            // Product service
            .route("/PRODUCT-SERVICE/products", get(list_products).post(create_product))
            .route("/PRODUCT-SERVICE/products/status", get(product_status))
            .route(
                "/PRODUCT-SERVICE/products/{id}",
                get(get_product).put(update_product).delete(delete_product),
            )
            .route("/PRODUCT-SERVICE/categories", get(list_categories))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state, addr }
    }

    /// Gateway base URL for client configuration.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Revoke every issued token; subsequent authenticated requests get 401.
    pub fn revoke_all_tokens(&self) {
        lock(&self.state).tokens.clear();
    }

    /// Snapshot of the request counters.
    #[must_use]
    pub fn hits(&self) -> Hits {
        lock(&self.state).hits
    }

    /// Remaining stock of a product.
    #[must_use]
    pub fn stock_of(&self, product_id: i64) -> u32 {
        lock(&self.state).products[&product_id].stock
    }

    /// Server-held cart line count for a user.
    #[must_use]
    pub fn server_cart_len(&self, user_id: i64) -> usize {
        lock(&self.state)
            .carts
            .get(&user_id)
            .map_or(0, Vec::len)
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn unauthorized() -> Response {
    StatusCode::UNAUTHORIZED.into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, message.to_owned()).into_response()
}

fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

async fn login(State(state): State<SharedState>, axum::Json(body): axum::Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default().to_owned();

    let mut state = lock(&state);
    let Some(user) = state
        .users
        .values()
        .find(|u| u.email == email && u.password == password)
        .cloned()
    else {
        return unauthorized();
    };

    let token = state.issue_token(user.id);
    axum::Json(json!({
        "token": token,
        "userId": user.id,
        "email": user.email,
        "role": user.role,
        "expiresIn": 3600,
    }))
    .into_response()
}

async fn register(State(state): State<SharedState>, axum::Json(body): axum::Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    let mut state = lock(&state);

    if state.users.values().any(|u| u.email == email) {
        return bad_request("Email already registered");
    }

    let id = state.users.keys().max().copied().unwrap_or(0) + 1;
    let user = TestUser {
        id,
        email,
        password: body["password"].as_str().unwrap_or_default().to_owned(),
        role: "CLIENT".to_owned(),
        first_name: body["firstName"].as_str().unwrap_or_default().to_owned(),
        last_name: body["lastName"].as_str().unwrap_or_default().to_owned(),
    };
    state.users.insert(id, user.clone());

    (StatusCode::CREATED, axum::Json(GatewayState::user_json(&user))).into_response()
}

async fn logout() -> Response {
    axum::Json(json!({ "message": "Logged out successfully" })).into_response()
}

async fn list_users(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }

    let mut users: Vec<&TestUser> = state.users.values().collect();
    users.sort_by_key(|u| u.id);
    axum::Json(Value::Array(
        users.into_iter().map(GatewayState::user_json).collect(),
    ))
    .into_response()
}

async fn create_user_record(
    State(state): State<SharedState>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    {
        let state = lock(&state);
        if state.user_for_token(&headers).is_none() {
            return unauthorized();
        }
    }
    register(State(state), axum::Json(body)).await
}

async fn get_user_by_email(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(email): Path<String>,
) -> Response {
    let state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }
    state
        .users
        .values()
        .find(|u| u.email == email)
        .map_or_else(not_found, |user| {
            axum::Json(GatewayState::user_json(user)).into_response()
        })
}

async fn get_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }
    state.users.get(&id).map_or_else(not_found, |user| {
        axum::Json(GatewayState::user_json(user)).into_response()
    })
}

async fn update_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }
    let Some(user) = state.users.get_mut(&id) else {
        return not_found();
    };

    if let Some(first_name) = body["firstName"].as_str() {
        user.first_name = first_name.to_owned();
    }
    if let Some(last_name) = body["lastName"].as_str() {
        user.last_name = last_name.to_owned();
    }
    let user = user.clone();
    axum::Json(GatewayState::user_json(&user)).into_response()
}

async fn delete_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }
    if state.users.remove(&id).is_none() {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn set_user_role(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }
    let Some(role) = params.get("role").cloned() else {
        return bad_request("Missing role");
    };
    let Some(user) = state.users.get_mut(&id) else {
        return not_found();
    };
    user.role = role;
    let user = user.clone();
    axum::Json(GatewayState::user_json(&user)).into_response()
}

async fn get_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    state.hits.cart_get += 1;
    let Some(user_id) = state.user_for_token(&headers) else {
        return unauthorized();
    };
    axum::Json(state.cart_json(user_id)).into_response()
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartItemParams {
    product_id: i64,
    quantity: u32,
}

async fn add_cart_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<CartItemParams>,
) -> Response {
    let mut state = lock(&state);
    state.hits.cart_mutations += 1;
    let Some(user_id) = state.user_for_token(&headers) else {
        return unauthorized();
    };
    if !state.products.contains_key(&params.product_id) {
        return bad_request("Unknown product");
    }

    let lines = state.carts.entry(user_id).or_default();
    if let Some(line) = lines.iter_mut().find(|l| l.product_id == params.product_id) {
        line.quantity += params.quantity;
    } else {
        lines.push(CartLine {
            product_id: params.product_id,
            quantity: params.quantity,
        });
    }
    axum::Json(state.cart_json(user_id)).into_response()
}

async fn update_cart_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<CartItemParams>,
) -> Response {
    let mut state = lock(&state);
    state.hits.cart_mutations += 1;
    let Some(user_id) = state.user_for_token(&headers) else {
        return unauthorized();
    };

    let lines = state.carts.entry(user_id).or_default();
    let Some(line) = lines.iter_mut().find(|l| l.product_id == params.product_id) else {
        return bad_request("Product not in cart");
    };
    line.quantity = params.quantity;
    axum::Json(state.cart_json(user_id)).into_response()
}

async fn remove_cart_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(product_id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    state.hits.cart_mutations += 1;
    let Some(user_id) = state.user_for_token(&headers) else {
        return unauthorized();
    };

    let lines = state.carts.entry(user_id).or_default();
    lines.retain(|l| l.product_id != product_id);
    axum::Json(state.cart_json(user_id)).into_response()
}

async fn clear_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    state.hits.cart_mutations += 1;
    let Some(user_id) = state.user_for_token(&headers) else {
        return unauthorized();
    };
    state.carts.remove(&user_id);
    StatusCode::NO_CONTENT.into_response()
}

async fn create_order(
    State(state): State<SharedState>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let mut state = lock(&state);
    state.hits.order_create += 1;
    let Some(user_id) = state.user_for_token(&headers) else {
        return unauthorized();
    };

    let Some(lines) = body["orderLineItemsDtoList"].as_array().cloned() else {
        return bad_request("Malformed order request");
    };
    if lines.is_empty() {
        return bad_request("Cart is empty");
    }

    // Validate availability and stock before committing anything
    let mut parsed: Vec<(i64, u32)> = Vec::new();
    for line in &lines {
        let product_id = line["productId"].as_i64().unwrap_or_default();
        let quantity = u32::try_from(line["quantity"].as_i64().unwrap_or_default()).unwrap_or(0);
        let Some(product) = state.products.get(&product_id) else {
            return bad_request("Product unavailable");
        };
        if quantity == 0 || quantity > product.stock {
            return bad_request("Insufficient stock");
        }
        parsed.push((product_id, quantity));
    }

    let mut total = Decimal::ZERO;
    let mut order_lines = Vec::new();
    for (index, (product_id, quantity)) in parsed.iter().enumerate() {
        let product = state.products.get_mut(product_id).unwrap();
        product.stock -= quantity;
        total += product.price * Decimal::from(*quantity);
        order_lines.push(json!({
            "id": index as i64 + 1,
            "productId": product_id,
            "quantity": quantity,
            "price": product.price,
        }));
    }

    let id = state.next_order_id;
    state.next_order_id += 1;
    let order = json!({
        "id": id,
        "orderNumber": uuid::Uuid::new_v4().to_string(),
        "totalPrice": total,
        "orderDate": Utc::now().to_rfc3339(),
        "status": "CREATED",
        "userId": user_id,
        "orderLineItems": order_lines,
    });
    state.orders.push(order.clone());

    (StatusCode::CREATED, axum::Json(order)).into_response()
}

async fn list_orders(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }
    axum::Json(Value::Array(state.orders.clone())).into_response()
}

async fn get_order(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }
    state
        .orders
        .iter()
        .find(|o| o["id"].as_i64() == Some(id))
        .map_or_else(not_found, |order| axum::Json(order.clone()).into_response())
}

async fn set_order_status(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }
    let Some(status) = body.as_str().map(ToOwned::to_owned) else {
        return bad_request("Malformed status");
    };
    let Some(order) = state
        .orders
        .iter_mut()
        .find(|o| o["id"].as_i64() == Some(id))
    else {
        return not_found();
    };
    order["status"] = Value::String(status);
    let order = order.clone();
    axum::Json(order).into_response()
}

async fn list_products(State(state): State<SharedState>) -> Response {
    let mut state = lock(&state);
    state.hits.product_list += 1;
    axum::Json(Value::Array(
        state
            .products
            .values()
            .map(GatewayState::product_json)
            .collect(),
    ))
    .into_response()
}

async fn get_product(State(state): State<SharedState>, Path(id): Path<i64>) -> Response {
    let state = lock(&state);
    state.products.get(&id).map_or_else(not_found, |product| {
        axum::Json(GatewayState::product_json(product)).into_response()
    })
}

async fn create_product(
    State(state): State<SharedState>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }

    let id = state.products.keys().max().copied().unwrap_or(0) + 1;
    let product = TestProduct {
        id,
        name: body["name"].as_str().unwrap_or_default().to_owned(),
        price: body["price"]
            .as_str()
            .and_then(|p| p.parse().ok())
            .or_else(|| body["price"].as_f64().and_then(Decimal::from_f64_retain))
            .unwrap_or_default(),
        stock: u32::try_from(body["stockQuantity"].as_i64().unwrap_or(0)).unwrap_or(0),
        manufacturer: body["manufacturer"].as_str().unwrap_or_default().to_owned(),
        category_id: body["categoryId"].as_i64().unwrap_or(0),
        category_name: "Uncategorized".to_owned(),
    };
    state.products.insert(id, product.clone());

    (
        StatusCode::CREATED,
        axum::Json(GatewayState::product_json(&product)),
    )
        .into_response()
}

async fn update_product(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }
    let Some(product) = state.products.get_mut(&id) else {
        return not_found();
    };

    if let Some(name) = body["name"].as_str() {
        product.name = name.to_owned();
    }
    if let Some(price) = body["price"]
        .as_str()
        .and_then(|p| p.parse().ok())
        .or_else(|| body["price"].as_f64().and_then(Decimal::from_f64_retain))
    {
        product.price = price;
    }
    if let Some(stock) = body["stockQuantity"].as_i64() {
        product.stock = u32::try_from(stock).unwrap_or(0);
    }
    let product = product.clone();
    axum::Json(GatewayState::product_json(&product)).into_response()
}

async fn delete_product(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    if state.user_for_token(&headers).is_none() {
        return unauthorized();
    }
    if state.products.remove(&id).is_none() {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn product_status() -> &'static str {
    "Product service is up"
}

async fn list_categories(State(state): State<SharedState>) -> Response {
    let state = lock(&state);
    let mut categories: BTreeMap<i64, String> = BTreeMap::new();
    for product in state.products.values() {
        categories.insert(product.category_id, product.category_name.clone());
    }
    axum::Json(Value::Array(
        categories
            .into_iter()
            .map(|(id, name)| json!({ "id": id, "name": name }))
            .collect(),
    ))
    .into_response()
}

// =============================================================================
// Test context
// =============================================================================

/// One fake gateway plus one engine, wired together with a throwaway
/// credential file.
pub struct TestContext {
    pub gateway: FakeGateway,
    pub storefront: Storefront,
    _credentials_dir: tempfile::TempDir,
}

impl TestContext {
    /// Spawn a fresh gateway and engine.
    pub async fn new() -> Self {
        let gateway = FakeGateway::spawn().await;
        let credentials_dir = tempfile::tempdir().unwrap();

        let config = ClientConfig {
            api_url: gateway.url().parse().unwrap(),
            credentials_path: credentials_dir.path().join("credentials.json"),
            request_timeout: Duration::from_secs(5),
            // Short window so auto-reset tests finish quickly
            order_banner_window: Duration::from_millis(250),
        };
        let storefront = Storefront::new(config).unwrap();

        Self {
            gateway,
            storefront,
            _credentials_dir: credentials_dir,
        }
    }

    /// Sign in the seeded administrator (a@b.com, user id 7).
    pub async fn login_admin(&self) {
        let email = Email::parse("a@b.com").unwrap();
        self.storefront.session().login(&email, "x").await.unwrap();
    }

    /// Sign in the seeded regular shopper (shopper@example.com, user id 8).
    pub async fn login_shopper(&self) {
        let email = Email::parse("shopper@example.com").unwrap();
        self.storefront
            .session()
            .login(&email, "secret")
            .await
            .unwrap();
    }
}

//! Domain types shared across the engine's services.
//!
//! These are the typed counterparts of the gateway's JSON payloads. Parsing
//! happens at the service boundary; a payload that does not match its
//! declared shape fails fast with [`crate::ClientError::Parse`] instead of
//! leaking half-formed records into the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vitrine_core::{CategoryId, Email, OrderId, OrderLineId, OrderStatus, ProductId, UserId};

// =============================================================================
// Users
// =============================================================================

/// An authenticated user as the engine tracks it.
///
/// Derived from login responses or profile fetches; `username` mirrors the
/// email address, which is the only display handle the backend guarantees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User's backend ID.
    pub id: UserId,
    /// Display handle (the email address).
    pub username: String,
    /// Email address.
    pub email: Option<Email>,
    /// Given name, when the profile has been fetched.
    pub first_name: Option<String>,
    /// Family name, when the profile has been fetched.
    pub last_name: Option<String>,
    /// Backend role strings; collapsed to a single role per session update.
    pub roles: Vec<String>,
    /// Fine-grained permissions, when the backend hands them out.
    pub permissions: Option<Vec<String>>,
}

/// Canonical profile record returned by the user service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub role: String,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProfileRecord {
    /// Fold the wire record into the engine's [`User`] shape.
    #[must_use]
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.email.to_string(),
            email: Some(self.email),
            first_name: self.first_name,
            last_name: self.last_name,
            roles: vec![self.role],
            permissions: None,
        }
    }
}

/// Fields an authenticated user may change on their own profile.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Payload for creating an account through the auth service.
///
/// Registration does not imply login; the new user still signs in afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// The created account record echoed back by the auth service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub role: String,
}

// =============================================================================
// Products
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
}

/// A product as the catalog and the cart present it.
///
/// The cart service returns only a slice of this (id, name, price, image);
/// the remaining fields are defaulted on cart-derived summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(rename = "productCategory", default)]
    pub category: Option<CategorySummary>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating or replacing a product (administrative).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub manufacturer: String,
    pub category_id: CategoryId,
}

// =============================================================================
// Cart
// =============================================================================

/// One line of the locally projected cart.
///
/// `subtotal` comes from the cart service verbatim; the engine never
/// recomputes it from price and quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductSummary,
    pub quantity: u32,
    pub subtotal: Decimal,
}

// =============================================================================
// Orders
// =============================================================================

/// One line of a persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: OrderLineId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

/// A persisted order.
///
/// Immutable once created except for `status`, which only an administrator
/// may transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub total_price: Decimal,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub order_line_items: Vec<OrderLineItem>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_record_into_user() {
        let json = r#"{
            "id": 7,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "role": "ADMIN",
            "shippingAddress": null,
            "phone": null,
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let record: ProfileRecord = serde_json::from_str(json).unwrap();
        let user = record.into_user();

        assert_eq!(user.id, UserId::new(7));
        assert_eq!(user.username, "ada@example.com");
        assert_eq!(user.roles, vec!["ADMIN".to_owned()]);
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_product_summary_parses_catalog_payload() {
        let json = r#"{
            "id": 5,
            "name": "Mechanical Keyboard",
            "price": 89.99,
            "stockQuantity": 12,
            "imageUrl": "https://cdn.example.com/kb.png",
            "manufacturer": "KeyCo",
            "productCategory": { "id": 2, "name": "Peripherals" }
        }"#;
        let product: ProductSummary = serde_json::from_str(json).unwrap();

        assert_eq!(product.id, ProductId::new(5));
        assert_eq!(product.stock_quantity, 12);
        assert_eq!(
            product.category.as_ref().map(|c| c.name.as_str()),
            Some("Peripherals")
        );
    }

    #[test]
    fn test_order_parses_wire_payload() {
        let json = r#"{
            "id": 11,
            "orderNumber": "c5b4a3",
            "totalPrice": 30.0,
            "orderDate": "2024-05-04T12:30:00Z",
            "status": "CREATED",
            "userId": 7,
            "orderLineItems": [
                { "id": 1, "productId": 5, "quantity": 3, "price": 10.0 }
            ]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();

        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.order_line_items.len(), 1);
        assert_eq!(order.order_line_items[0].product_id, ProductId::new(5));
        assert_eq!(order.total_price, Decimal::new(300, 1));
    }

    #[test]
    fn test_order_tolerates_missing_optional_fields() {
        let json = r#"{
            "id": 11,
            "orderNumber": "c5b4a3",
            "totalPrice": 30.0,
            "orderDate": "2024-05-04T12:30:00Z",
            "status": "CONFIRMED"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert!(order.user_id.is_none());
        assert!(order.order_line_items.is_empty());
    }

    #[test]
    fn test_profile_update_skips_absent_fields() {
        let update = ProfileUpdate {
            first_name: Some("Ada".to_owned()),
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "firstName": "Ada" }));
    }
}

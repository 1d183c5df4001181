//! Per-service clients for the gateway's backend services.
//!
//! Each module owns the wire DTOs and paths of one backend service:
//!
//! - [`auth`] - login, registration, logout
//! - [`users`] - profiles and the administrative user directory
//! - [`cart`] - the server-held cart and its local projection
//! - [`orders`] - order submission, history, and status administration
//! - [`products`] - the product and category catalog

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod users;

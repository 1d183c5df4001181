//! Vitrine Client - session and cart synchronization engine.
//!
//! # Architecture
//!
//! The backend is a set of independent services (auth, user, product, cart,
//! order) behind a single gateway. The server is the source of truth for
//! everything it holds - the engine keeps local *projections* only:
//!
//! - [`SessionManager`] owns authentication state (login, registration,
//!   logout, profile) and restores it from the [`CredentialStore`] at start.
//! - [`Gateway`] is the single outbound path: it attaches the bearer token
//!   to every request and tears the session down on an authorization
//!   failure before re-raising the error.
//! - [`CartSynchronizer`] mirrors the server-held cart; every mutation is a
//!   round trip and the local projection is replaced wholesale from each
//!   response.
//! - [`OrderSubmissionPipeline`] turns the cart into an order and clears the
//!   cart on success.
//! - [`ProductCatalog`] and [`UserDirectory`] cover the catalog and the
//!   administrative user operations.
//!
//! All process-wide state (session, cart projection, order history,
//! submission state, navigation) is published through [`Store`] values;
//! consumers hold read-only subscriptions and route every mutation through
//! the owning component.
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_client::{ClientConfig, Storefront};
//! use vitrine_core::{Email, ProductId};
//!
//! let storefront = Storefront::new(ClientConfig::from_env()?)?;
//!
//! let email = Email::parse("a@b.com")?;
//! storefront.session().login(&email, "secret").await?;
//!
//! storefront.cart().add_item(ProductId::new(5), 2).await?;
//! let order = storefront.orders().submit().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod services;
pub mod session;
pub mod state;
pub mod store;
pub mod types;

pub use config::{ClientConfig, ConfigError};
pub use credentials::{CredentialStore, CredentialStoreError, StoredCredentials};
pub use error::ClientError;
pub use gateway::Gateway;
pub use services::cart::CartSynchronizer;
pub use services::orders::{OrderSubmissionPipeline, SubmissionState};
pub use services::products::ProductCatalog;
pub use services::users::UserDirectory;
pub use session::{Route, Session, SessionManager};
pub use state::Storefront;
pub use store::{Store, Subscription};

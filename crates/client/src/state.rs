//! Engine root: constructs and wires every component.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::services::cart::CartSynchronizer;
use crate::services::orders::OrderSubmissionPipeline;
use crate::services::products::ProductCatalog;
use crate::services::users::UserDirectory;
use crate::session::{Route, Session, SessionManager};
use crate::store::{Store, Subscription};

/// The storefront engine.
///
/// Owns the process-wide stores (session, cart projection, order history,
/// navigation) and the components that mutate them. One instance exists per
/// process; it is cheaply cloneable and every consumer receives the same
/// underlying state.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    session_manager: SessionManager,
    cart: CartSynchronizer,
    orders: OrderSubmissionPipeline,
    products: ProductCatalog,
    users: UserDirectory,
    session: Store<Session>,
    navigation: Store<Option<Route>>,
}

impl Storefront {
    /// Construct the engine.
    ///
    /// The credential store is read once here: a stored record yields an
    /// authenticated initial session, a missing or corrupt one yields the
    /// unauthenticated state (and the corrupt file is discarded).
    ///
    /// # Errors
    ///
    /// Returns an error if the credential slot cannot be read or the HTTP
    /// client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let credentials = CredentialStore::open(config.credentials_path.clone())?;

        let initial = credentials
            .get()
            .map_or_else(Session::unauthenticated, |stored| {
                Session::authenticated(stored.user)
            });
        let session = Store::new(initial);
        let navigation = Store::new(None);

        let gateway = Gateway::new(
            &config,
            credentials.clone(),
            session.clone(),
            navigation.clone(),
        )?;

        let session_manager = SessionManager::new(
            gateway.clone(),
            credentials,
            session.clone(),
            navigation.clone(),
        );
        let cart = CartSynchronizer::new(gateway.clone(), session.clone());
        let orders = OrderSubmissionPipeline::new(
            gateway.clone(),
            cart.clone(),
            config.order_banner_window,
        );
        let products = ProductCatalog::new(gateway.clone());
        let users = UserDirectory::new(gateway);

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                session_manager,
                cart,
                orders,
                products,
                users,
                session,
                navigation,
            }),
        })
    }

    /// Keep the cart projection aligned with session transitions.
    ///
    /// Spawns a task that empties the local projection when the session
    /// ends and reloads the server-held cart when a session begins - the
    /// cart always belongs to the currently authenticated user. Long-lived
    /// hosts call this once after construction; one-shot commands can skip
    /// it.
    pub fn spawn_session_cart_guard(&self) -> tokio::task::JoinHandle<()> {
        let mut sessions = self.inner.session.subscribe();
        let cart = self.inner.cart.clone();

        tokio::spawn(async move {
            while sessions.changed().await.is_ok() {
                let authenticated = sessions.borrow_and_update().is_authenticated;
                if authenticated {
                    if let Err(e) = cart.load_cart().await {
                        tracing::warn!(error = %e, "cart reload after login failed");
                    }
                } else {
                    cart.clear_local();
                }
            }
        })
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Session operations (login, logout, profile).
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session_manager
    }

    /// Cart operations and the local projection.
    #[must_use]
    pub fn cart(&self) -> &CartSynchronizer {
        &self.inner.cart
    }

    /// Order submission, history, and status administration.
    #[must_use]
    pub fn orders(&self) -> &OrderSubmissionPipeline {
        &self.inner.orders
    }

    /// Product and category catalog.
    #[must_use]
    pub fn products(&self) -> &ProductCatalog {
        &self.inner.products
    }

    /// Administrative user directory.
    #[must_use]
    pub fn users(&self) -> &UserDirectory {
        &self.inner.users
    }

    /// Read-only subscription to navigation intents (e.g., the jump to the
    /// login entry point after a credential rejection).
    #[must_use]
    pub fn navigation(&self) -> Subscription<Option<Route>> {
        self.inner.navigation.subscribe()
    }

    /// Read-only subscription to session transitions.
    #[must_use]
    pub fn watch_session(&self) -> Subscription<Session> {
        self.inner.session.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::credentials::StoredCredentials;
    use crate::types::User;
    use vitrine_core::{Role, UserId};

    fn test_config(dir: &tempfile::TempDir) -> ClientConfig {
        ClientConfig {
            api_url: "http://127.0.0.1:9".parse().unwrap(),
            credentials_path: dir.path().join("credentials.json"),
            request_timeout: Duration::from_secs(1),
            order_banner_window: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_fresh_profile_starts_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let storefront = Storefront::new(test_config(&dir)).unwrap();

        assert!(!storefront.session().is_logged_in());
        assert!(storefront.cart().items().is_empty());
    }

    #[tokio::test]
    async fn test_stored_credential_restores_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let credentials = CredentialStore::open(config.credentials_path.clone()).unwrap();
        credentials
            .store(StoredCredentials {
                access_token: "T1".to_owned(),
                refresh_token: None,
                user: User {
                    id: UserId::new(7),
                    username: "a@b.com".to_owned(),
                    email: None,
                    first_name: None,
                    last_name: None,
                    roles: vec!["ADMIN".to_owned()],
                    permissions: None,
                },
            })
            .unwrap();

        let storefront = Storefront::new(config).unwrap();
        assert!(storefront.session().is_logged_in());
        assert!(storefront.session().is_admin());
        assert_eq!(storefront.session().current().role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_corrupt_credential_forces_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        std::fs::write(&config.credentials_path, b"{ not json").unwrap();

        let storefront = Storefront::new(config.clone()).unwrap();
        assert!(!storefront.session().is_logged_in());
        assert!(storefront.session().current_token().is_none());
        assert!(!config.credentials_path.exists());
    }

    #[tokio::test]
    async fn test_session_cart_guard_clears_projection_on_logout() {
        use crate::types::{CartItem, ProductSummary};
        use rust_decimal::Decimal;
        use vitrine_core::ProductId;

        let dir = tempfile::tempdir().unwrap();
        let storefront = Storefront::new(test_config(&dir)).unwrap();
        let guard = storefront.spawn_session_cart_guard();

        // Seed a projection, then end the session
        storefront.inner.cart.seed(vec![CartItem {
            product: ProductSummary {
                id: ProductId::new(5),
                name: "keyboard".to_owned(),
                price: Decimal::TEN,
                image_url: None,
                stock_quantity: 0,
                manufacturer: String::new(),
                category: None,
                created_at: None,
                updated_at: None,
            },
            quantity: 3,
            subtotal: Decimal::new(300, 1),
        }]);
        assert_eq!(storefront.cart().item_count(), 3);

        storefront
            .inner
            .session
            .publish(Session::unauthenticated());

        // Give the guard task a chance to observe the transition
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert!(storefront.cart().items().is_empty());
        guard.abort();
    }
}

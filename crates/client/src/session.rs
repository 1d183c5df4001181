//! Authentication state and the manager that owns it.
//!
//! Exactly one [`Session`] value exists per process, published through a
//! [`Store`] constructed by [`crate::Storefront`]. Consumers subscribe
//! read-only; every transition goes through [`SessionManager`] (login,
//! logout, profile updates) or through the gateway's authorization-failure
//! teardown.

use std::sync::Arc;

use reqwest::Method;
use secrecy::SecretString;

use vitrine_core::{Email, Role};

use crate::credentials::{CredentialStore, StoredCredentials};
use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::services::{auth, users};
use crate::store::{Store, Subscription};
use crate::types::{ProfileUpdate, Registration, RegistrationRequest, User};

/// Navigation intents the engine can request from its presentation layer.
///
/// Published when the session ends (logout or credential rejection) so the
/// UI can move the shopper to the login entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The login entry point.
    Login,
}

/// The process-wide authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Whether a user is currently authenticated.
    pub is_authenticated: bool,
    /// The authenticated user, when known.
    pub user: Option<User>,
    /// Collapsed role; `None` when unauthenticated or the backend handed
    /// out an empty role set.
    pub role: Option<Role>,
}

impl Session {
    /// The unauthenticated state.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            is_authenticated: false,
            user: None,
            role: None,
        }
    }

    /// An authenticated session for `user`.
    ///
    /// The role is collapsed from the user's role strings here, once per
    /// session update, not re-derived on every read.
    #[must_use]
    pub fn authenticated(user: User) -> Self {
        let role = Role::from_role_strings(&user.roles);
        Self {
            is_authenticated: true,
            user: Some(user),
            role,
        }
    }

    /// Whether this session belongs to an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Owns the session: login, registration, logout, and profile operations.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,
}

struct SessionManagerInner {
    gateway: Gateway,
    credentials: CredentialStore,
    session: Store<Session>,
    navigation: Store<Option<Route>>,
}

impl SessionManager {
    pub(crate) fn new(
        gateway: Gateway,
        credentials: CredentialStore,
        session: Store<Session>,
        navigation: Store<Option<Route>>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionManagerInner {
                gateway,
                credentials,
                session,
                navigation,
            }),
        }
    }

    /// Authenticate against the auth service.
    ///
    /// On success the token and derived user are persisted to the
    /// credential store and the new session is published to all
    /// subscribers.
    ///
    /// # Errors
    ///
    /// Rejected credentials and transport failures propagate unchanged so
    /// the caller can show a generic failure.
    pub async fn login(&self, email: &Email, password: &str) -> Result<Session, ClientError> {
        let response = auth::login(&self.inner.gateway, email, password).await?;

        // The login response carries a single role string; the canonical
        // profile (with names) is fetched separately on demand.
        let user = User {
            id: response.user_id,
            username: response.email.to_string(),
            email: Some(response.email),
            first_name: None,
            last_name: None,
            roles: vec![response.role],
            permissions: None,
        };

        self.inner.credentials.store(StoredCredentials {
            access_token: response.token,
            refresh_token: None,
            user: user.clone(),
        })?;

        let user_id = user.id;
        let session = Session::authenticated(user);
        self.inner.session.publish(session.clone());
        tracing::info!(%user_id, "logged in");

        Ok(session)
    }

    /// Create an account through the auth service.
    ///
    /// Registration does not imply login: the session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the auth service rejects the registration.
    pub async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<Registration, ClientError> {
        auth::register(&self.inner.gateway, request).await
    }

    /// End the session.
    ///
    /// When a refresh token is stored the backend is informed best-effort;
    /// the local teardown - credential store cleared, unauthenticated
    /// session published, navigation to login - happens unconditionally,
    /// whatever the backend said.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.inner.credentials.refresh_token()
            && let Err(e) = auth::logout(&self.inner.gateway, &refresh_token).await
        {
            tracing::debug!(error = %e, "backend logout failed; clearing local session anyway");
        }

        self.clear_local_session();
    }

    fn clear_local_session(&self) {
        if let Err(e) = self.inner.credentials.clear() {
            tracing::error!(error = %e, "failed to clear stored credential");
        }
        self.inner.session.publish(Session::unauthenticated());
        self.inner.navigation.publish(Some(Route::Login));
        tracing::info!("logged out");
    }

    /// Fetch the canonical profile from the user service and republish it
    /// inside the session, leaving the authenticated flag untouched.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::NotAuthenticated`] when no user id is
    /// known; otherwise propagates the user-service error.
    pub async fn current_profile(&self) -> Result<User, ClientError> {
        let user_id = self.current_user_id()?;
        let record = users::fetch_profile(&self.inner.gateway, user_id).await?;

        let user = record.into_user();
        self.republish_user(user.clone());
        Ok(user)
    }

    /// Update the backend profile and republish the result.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::NotAuthenticated`] when no user id is
    /// known; otherwise propagates the user-service error.
    pub async fn update_profile(&self, fields: &ProfileUpdate) -> Result<User, ClientError> {
        let user_id = self.current_user_id()?;
        let record = users::update_profile(&self.inner.gateway, user_id, fields).await?;

        let user = record.into_user();
        self.republish_user(user.clone());
        Ok(user)
    }

    /// Delete the backend profile, then log out.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::NotAuthenticated`] when no user id is
    /// known. The logout only happens after the backend delete succeeded.
    pub async fn delete_profile(&self) -> Result<(), ClientError> {
        let user_id = self.current_user_id()?;
        self.inner
            .gateway
            .send_unit(
                self.inner
                    .gateway
                    .request(Method::DELETE, &users::user_path(user_id)),
            )
            .await?;

        self.logout().await;
        Ok(())
    }

    /// Whether a user is currently authenticated. Never blocks, no I/O.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.inner.session.with(|s| s.is_authenticated)
    }

    /// Whether the current session belongs to an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.inner.session.with(Session::is_admin)
    }

    /// The stored bearer token, if any. Never blocks, no I/O.
    #[must_use]
    pub fn current_token(&self) -> Option<SecretString> {
        self.inner.credentials.token()
    }

    /// Clone of the latest published session.
    #[must_use]
    pub fn current(&self) -> Session {
        self.inner.session.get()
    }

    /// Read-only subscription to session transitions.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<Session> {
        self.inner.session.subscribe()
    }

    fn current_user_id(&self) -> Result<vitrine_core::UserId, ClientError> {
        self.inner
            .session
            .with(|s| s.user.as_ref().map(|u| u.id))
            .ok_or(ClientError::NotAuthenticated)
    }

    fn republish_user(&self, user: User) {
        let is_authenticated = self.inner.session.with(|s| s.is_authenticated);
        let role = Role::from_role_strings(&user.roles);
        self.inner.session.publish(Session {
            is_authenticated,
            user: Some(user),
            role,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::config::ClientConfig;
    use vitrine_core::UserId;

    fn sample_user(roles: &[&str]) -> User {
        User {
            id: UserId::new(7),
            username: "a@b.com".to_owned(),
            email: Some("a@b.com".parse().unwrap()),
            first_name: None,
            last_name: None,
            roles: roles.iter().map(|r| (*r).to_owned()).collect(),
            permissions: None,
        }
    }

    /// Manager wired to an unreachable gateway: any attempted request fails
    /// with a transport error, which the tests use to prove no request was
    /// needed.
    fn test_manager(dir: &tempfile::TempDir) -> (SessionManager, Store<Session>, Store<Option<Route>>) {
        let credentials =
            CredentialStore::open(dir.path().join("credentials.json")).unwrap();
        let session = Store::new(Session::unauthenticated());
        let navigation = Store::new(None);

        let config = ClientConfig {
            // Reserved port; nothing listens here
            api_url: "http://127.0.0.1:9".parse().unwrap(),
            credentials_path: PathBuf::from("unused"),
            request_timeout: Duration::from_secs(1),
            order_banner_window: Duration::from_secs(5),
        };
        let gateway = Gateway::new(
            &config,
            credentials.clone(),
            session.clone(),
            navigation.clone(),
        )
        .unwrap();

        (
            SessionManager::new(gateway, credentials, session.clone(), navigation.clone()),
            session,
            navigation,
        )
    }

    #[test]
    fn test_authenticated_session_derives_role_once() {
        let session = Session::authenticated(sample_user(&["ADMIN", "USER"]));
        assert!(session.is_authenticated);
        assert_eq!(session.role, Some(Role::Admin));
        assert!(session.is_admin());

        let session = Session::authenticated(sample_user(&["USER"]));
        assert_eq!(session.role, Some(Role::User));

        let session = Session::authenticated(sample_user(&[]));
        assert!(session.is_authenticated);
        assert_eq!(session.role, None);
    }

    #[test]
    fn test_unauthenticated_session() {
        let session = Session::unauthenticated();
        assert!(!session.is_authenticated);
        assert!(session.user.is_none());
        assert!(!session.is_admin());
    }

    #[tokio::test]
    async fn test_current_profile_requires_user_id() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, _, _) = test_manager(&dir);

        // No session, so the call must fail before reaching the (dead)
        // gateway; a transport error here would mean a request was sent.
        let err = manager.current_profile().await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_logout_clears_local_state_even_when_backend_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, session, navigation) = test_manager(&dir);

        // Simulate a logged-in state with a refresh token, so logout tries
        // (and fails) to inform the unreachable backend.
        manager
            .inner
            .credentials
            .store(StoredCredentials {
                access_token: "T1".to_owned(),
                refresh_token: Some("R1".to_owned()),
                user: sample_user(&["USER"]),
            })
            .unwrap();
        session.publish(Session::authenticated(sample_user(&["USER"])));

        manager.logout().await;

        assert!(!manager.is_logged_in());
        assert!(manager.current_token().is_none());
        assert_eq!(session.get(), Session::unauthenticated());
        assert_eq!(navigation.get(), Some(Route::Login));
    }

    #[tokio::test]
    async fn test_synchronous_reads_reflect_published_session() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, session, _) = test_manager(&dir);

        assert!(!manager.is_logged_in());
        assert!(!manager.is_admin());

        session.publish(Session::authenticated(sample_user(&["ADMIN"])));
        assert!(manager.is_logged_in());
        assert!(manager.is_admin());
    }
}

//! Gateway client - the single outbound path for every request.
//!
//! Two cross-cutting concerns live here and nowhere else:
//!
//! - **Credential injection**: when the credential store holds a token it is
//!   attached as a bearer header; otherwise the request goes out anonymous
//!   (never blocked).
//! - **Authorization failure**: any 401 response clears the credential
//!   store, publishes an unauthenticated session, requests navigation to
//!   the login entry point, and only then surfaces
//!   [`ClientError::Unauthorized`] so the caller's failure path still runs.
//!   No other component is permitted to perform this invalidation.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::ClientError;
use crate::session::{Route, Session};
use crate::store::Store;

/// HTTP client wrapper that fronts the backend gateway.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    http: reqwest::Client,
    base_url: Url,
    credentials: CredentialStore,
    session: Store<Session>,
    navigation: Store<Option<Route>>,
}

impl Gateway {
    /// Create a gateway client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub(crate) fn new(
        config: &ClientConfig,
        credentials: CredentialStore,
        session: Store<Session>,
        navigation: Store<Option<Route>>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(GatewayInner {
                http,
                base_url: config.api_url.clone(),
                credentials,
                session,
                navigation,
            }),
        })
    }

    /// Build a request for a gateway subpath, bearer header attached when a
    /// token is stored.
    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.inner.http.request(method, self.url(path));
        if let Some(token) = self.inner.credentials.token() {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{path}",
            self.inner.base_url.as_str().trim_end_matches('/')
        )
    }

    /// Send a request and parse the JSON response body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.execute(builder).await?;

        // Read the body as text first for better error diagnostics
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %snippet(&text),
                "failed to parse gateway response"
            );
            ClientError::Parse(e)
        })
    }

    /// Send a request and discard the response body.
    pub(crate) async fn send_unit(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<(), ClientError> {
        self.execute(builder).await.map(drop)
    }

    /// Send a request and return the response body as plain text.
    pub(crate) async fn send_text(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<String, ClientError> {
        let response = self.execute(builder).await?;
        Ok(response.text().await?)
    }

    /// Send the request and resolve the status code.
    ///
    /// 401 is handled here - session teardown, then the error re-raised -
    /// so business code never sees a half-valid session.
    async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_session();
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(
                %status,
                body = %snippet(&body),
                "gateway returned a non-success status"
            );
            return Err(ClientError::from_status(status, &body));
        }

        Ok(response)
    }

    /// Tear down the session after an authorization failure.
    fn invalidate_session(&self) {
        tracing::warn!("credential rejected by gateway; tearing down session");

        if let Err(e) = self.inner.credentials.clear() {
            tracing::error!(error = %e, "failed to clear stored credential");
        }
        self.inner.session.publish(Session::unauthenticated());
        self.inner.navigation.publish(Some(Route::Login));
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn test_gateway(dir: &tempfile::TempDir, with_token: bool) -> Gateway {
        let credentials =
            CredentialStore::open(dir.path().join("credentials.json")).unwrap();
        if with_token {
            credentials
                .store(crate::credentials::StoredCredentials {
                    access_token: "T1".to_owned(),
                    refresh_token: None,
                    user: crate::types::User {
                        id: vitrine_core::UserId::new(7),
                        username: "a@b.com".to_owned(),
                        email: None,
                        first_name: None,
                        last_name: None,
                        roles: vec!["USER".to_owned()],
                        permissions: None,
                    },
                })
                .unwrap();
        }

        let config = ClientConfig {
            api_url: "http://localhost:1111".parse().unwrap(),
            credentials_path: PathBuf::from("unused"),
            request_timeout: Duration::from_secs(5),
            order_banner_window: Duration::from_secs(5),
        };
        Gateway::new(
            &config,
            credentials,
            Store::new(Session::unauthenticated()),
            Store::new(None),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_url_joins_base_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = test_gateway(&dir, false);
        assert_eq!(
            gateway.url("/COMMANDE-SERVICE/api/cart"),
            "http://localhost:1111/COMMANDE-SERVICE/api/cart"
        );
    }

    #[tokio::test]
    async fn test_bearer_header_attached_when_token_stored() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = test_gateway(&dir, true);

        let request = gateway
            .request(Method::GET, "/COMMANDE-SERVICE/api/cart")
            .build()
            .unwrap();
        let auth = request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer T1");
    }

    #[tokio::test]
    async fn test_anonymous_request_without_token() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = test_gateway(&dir, false);

        let request = gateway
            .request(Method::GET, "/PRODUCT-SERVICE/products")
            .build()
            .unwrap();
        assert!(
            !request
                .headers()
                .contains_key(reqwest::header::AUTHORIZATION)
        );
    }
}

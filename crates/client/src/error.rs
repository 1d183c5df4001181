//! Engine error taxonomy.
//!
//! Every service call returns `Result<T, ClientError>`. HTTP statuses are
//! classified once, in the gateway, so business code only ever matches on
//! error kinds, never on raw status codes.

use reqwest::StatusCode;
use thiserror::Error;

use crate::credentials::CredentialStoreError;

/// Errors surfaced by the storefront engine.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure (gateway unreachable, connection reset).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The credential was rejected (401-class). The gateway has already
    /// torn the session down by the time this reaches a caller.
    #[error("unauthorized")]
    Unauthorized,

    /// The request was rejected by a service (400-class).
    #[error("{0}")]
    Validation(String),

    /// The resource does not exist (404-class).
    #[error("{0}")]
    NotFound(String),

    /// The service failed (500-class).
    #[error("{0}")]
    Server(String),

    /// A response body did not match the expected shape.
    #[error("response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The operation requires an authenticated session and there is none.
    #[error("not authenticated")]
    NotAuthenticated,

    /// An order was requested from an empty cart; nothing was sent.
    #[error("cart is empty")]
    EmptyCart,

    /// Cart quantities must be at least 1; removal goes through `remove_item`.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The durable credential slot could not be read or written.
    #[error("credential store error: {0}")]
    Credentials(#[from] CredentialStoreError),
}

impl ClientError {
    /// Classify a non-success, non-401 HTTP status into an error kind.
    ///
    /// 401 never reaches this function - the gateway resolves it first
    /// (session teardown) and returns [`ClientError::Unauthorized`] directly.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            None
        } else {
            Some(body.trim().to_owned())
        };

        match status.as_u16() {
            400..=499 if status == StatusCode::NOT_FOUND => Self::NotFound(
                message.unwrap_or_else(|| "Resource not found.".to_owned()),
            ),
            400..=499 => Self::Validation(
                message.unwrap_or_else(|| "Request was rejected.".to_owned()),
            ),
            _ => Self::Server(
                "Service unavailable. Please try again later.".to_owned(),
            ),
        }
    }

    /// Whether this error means the session is gone and the caller should
    /// not retry without re-authenticating.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_maps_to_validation() {
        let err = ClientError::from_status(StatusCode::BAD_REQUEST, "insufficient stock");
        assert!(matches!(err, ClientError::Validation(msg) if msg == "insufficient stock"));
    }

    #[test]
    fn test_bad_request_without_body_gets_fixed_message() {
        let err = ClientError::from_status(StatusCode::BAD_REQUEST, "  ");
        assert!(matches!(err, ClientError::Validation(msg) if msg == "Request was rejected."));
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err = ClientError::from_status(StatusCode::NOT_FOUND, "");
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[test]
    fn test_server_errors_get_try_again_later() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = ClientError::from_status(status, "stack trace goes here");
            assert!(
                matches!(&err, ClientError::Server(msg) if msg.contains("try again later")),
                "unexpected classification for {status}: {err}"
            );
        }
    }

    #[test]
    fn test_display_is_user_facing() {
        assert_eq!(ClientError::EmptyCart.to_string(), "cart is empty");
        assert_eq!(ClientError::Unauthorized.to_string(), "unauthorized");
        assert_eq!(
            ClientError::Validation("Cart validation failed.".to_owned()).to_string(),
            "Cart validation failed."
        );
    }

    #[test]
    fn test_is_auth_failure() {
        assert!(ClientError::Unauthorized.is_auth_failure());
        assert!(ClientError::NotAuthenticated.is_auth_failure());
        assert!(!ClientError::EmptyCart.is_auth_failure());
    }
}

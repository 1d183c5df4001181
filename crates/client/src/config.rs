//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VITRINE_API_URL` - Base URL of the backend gateway (e.g., http://localhost:1111)
//!
//! ## Optional
//! - `VITRINE_CREDENTIALS_PATH` - Durable credential slot
//!   (default: `$HOME/.vitrine/credentials.json`)
//! - `VITRINE_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `VITRINE_ORDER_BANNER_SECS` - Observation window before a finished
//!   order submission returns to idle (default: 5)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront engine configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend gateway; service subpaths are appended to it.
    pub api_url: Url,
    /// Durable slot for the bearer token and serialized user record.
    pub credentials_path: PathBuf,
    /// Transport-level timeout applied to every request.
    pub request_timeout: Duration,
    /// How long a finished order submission stays observable before the
    /// pipeline returns to idle.
    pub order_banner_window: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("VITRINE_API_URL")?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("VITRINE_API_URL".to_owned(), e.to_string()))?;

        let credentials_path = get_optional_env("VITRINE_CREDENTIALS_PATH")
            .map_or_else(default_credentials_path, PathBuf::from);

        let request_timeout =
            Duration::from_secs(get_env_seconds("VITRINE_REQUEST_TIMEOUT_SECS", 30)?);
        let order_banner_window =
            Duration::from_secs(get_env_seconds("VITRINE_ORDER_BANNER_SECS", 5)?);

        Ok(Self {
            api_url,
            credentials_path,
            request_timeout,
            order_banner_window,
        })
    }
}

/// Default location of the credential slot: one file per user profile.
fn default_credentials_path() -> PathBuf {
    let home = std::env::var("HOME").map_or_else(|_| PathBuf::from("."), PathBuf::from);
    home.join(".vitrine").join("credentials.json")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable as a number of seconds, with a default.
fn get_env_seconds(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
    }
}

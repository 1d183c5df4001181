//! Auth service wire calls.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use vitrine_core::{Email, UserId};

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::types::{Registration, RegistrationRequest};

const AUTH_PATH: &str = "/auth";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a Email,
    password: &'a str,
}

/// Successful login payload from the auth service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub token: String,
    pub user_id: UserId,
    pub email: Email,
    pub role: String,
    #[serde(default)]
    #[allow(dead_code)] // informational; the engine relies on 401 handling
    pub expires_in: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogoutRequest<'a> {
    refresh_token: &'a str,
}

pub(crate) async fn login(
    gateway: &Gateway,
    email: &Email,
    password: &str,
) -> Result<LoginResponse, ClientError> {
    let builder = gateway
        .request(Method::POST, &format!("{AUTH_PATH}/login"))
        .json(&LoginRequest { email, password });
    gateway.send_json(builder).await
}

pub(crate) async fn register(
    gateway: &Gateway,
    request: &RegistrationRequest,
) -> Result<Registration, ClientError> {
    let builder = gateway
        .request(Method::POST, &format!("{AUTH_PATH}/register"))
        .json(request);
    gateway.send_json(builder).await
}

pub(crate) async fn logout(gateway: &Gateway, refresh_token: &str) -> Result<(), ClientError> {
    let builder = gateway
        .request(Method::POST, &format!("{AUTH_PATH}/logout"))
        .json(&LogoutRequest { refresh_token });
    gateway.send_unit(builder).await
}

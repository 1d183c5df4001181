//! User service client: profiles and the administrative directory.

use std::sync::Arc;

use reqwest::Method;
use tracing::instrument;

use vitrine_core::{Email, Role, UserId};

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::types::{ProfileRecord, ProfileUpdate, RegistrationRequest};

const USERS_PATH: &str = "/MS-CLIENT/api/v1/users";

pub(crate) fn user_path(id: UserId) -> String {
    format!("{USERS_PATH}/{id}")
}

pub(crate) async fn fetch_profile(
    gateway: &Gateway,
    id: UserId,
) -> Result<ProfileRecord, ClientError> {
    gateway
        .send_json(gateway.request(Method::GET, &user_path(id)))
        .await
}

pub(crate) async fn update_profile(
    gateway: &Gateway,
    id: UserId,
    fields: &ProfileUpdate,
) -> Result<ProfileRecord, ClientError> {
    let builder = gateway.request(Method::PUT, &user_path(id)).json(fields);
    gateway.send_json(builder).await
}

/// Administrative client for the user directory.
///
/// The gateway enforces the ADMIN role server-side; these calls surface
/// whatever it answers.
#[derive(Clone)]
pub struct UserDirectory {
    inner: Arc<UserDirectoryInner>,
}

struct UserDirectoryInner {
    gateway: Gateway,
}

impl UserDirectory {
    pub(crate) fn new(gateway: Gateway) -> Self {
        Self {
            inner: Arc::new(UserDirectoryInner { gateway }),
        }
    }

    /// All registered users.
    ///
    /// # Errors
    ///
    /// Returns an error if the user service rejects or fails the request.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<ProfileRecord>, ClientError> {
        let gateway = &self.inner.gateway;
        gateway
            .send_json(gateway.request(Method::GET, USERS_PATH))
            .await
    }

    /// One user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn user_by_id(&self, id: UserId) -> Result<ProfileRecord, ClientError> {
        fetch_profile(&self.inner.gateway, id).await
    }

    /// One user by email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the request fails.
    #[instrument(skip(self))]
    pub async fn user_by_email(&self, email: &Email) -> Result<ProfileRecord, ClientError> {
        let gateway = &self.inner.gateway;
        gateway
            .send_json(gateway.request(Method::GET, &format!("{USERS_PATH}/email/{email}")))
            .await
    }

    /// Create a user record directly on the user service.
    ///
    /// # Errors
    ///
    /// Returns an error if the user service rejects the record (e.g., the
    /// email is already taken).
    #[instrument(skip(self, request))]
    pub async fn create_user(
        &self,
        request: &RegistrationRequest,
    ) -> Result<ProfileRecord, ClientError> {
        let gateway = &self.inner.gateway;
        let builder = gateway.request(Method::POST, USERS_PATH).json(request);
        gateway.send_json(builder).await
    }

    /// Update another user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update is rejected.
    #[instrument(skip(self, fields), fields(user_id = %id))]
    pub async fn update_user(
        &self,
        id: UserId,
        fields: &ProfileUpdate,
    ) -> Result<ProfileRecord, ClientError> {
        update_profile(&self.inner.gateway, id, fields).await
    }

    /// Delete a user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the delete is rejected.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ClientError> {
        let gateway = &self.inner.gateway;
        gateway
            .send_unit(gateway.request(Method::DELETE, &user_path(id)))
            .await
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the transition is
    /// rejected.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn set_role(&self, id: UserId, role: Role) -> Result<ProfileRecord, ClientError> {
        let gateway = &self.inner.gateway;
        let builder = gateway
            .request(Method::PUT, &format!("{USERS_PATH}/{id}/role"))
            .query(&[("role", role.to_string())]);
        gateway.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_path() {
        assert_eq!(user_path(UserId::new(7)), "/MS-CLIENT/api/v1/users/7");
    }
}

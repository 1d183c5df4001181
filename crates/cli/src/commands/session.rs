//! Session commands: login, logout, register, whoami.

use vitrine_client::types::RegistrationRequest;
use vitrine_client::{ClientError, Storefront};
use vitrine_core::Email;

/// Sign in; the engine persists the session to the credential file.
pub async fn login(
    storefront: &Storefront,
    email: &Email,
    password: &str,
) -> Result<(), ClientError> {
    let session = storefront.session().login(email, password).await?;

    let role = session
        .role
        .map_or_else(|| "none".to_owned(), |r| r.to_string());
    tracing::info!("Signed in as {email} (role: {role})");
    Ok(())
}

/// End the session. Local teardown happens even when the backend is down.
pub async fn logout(storefront: &Storefront) {
    storefront.session().logout().await;
    tracing::info!("Signed out");
}

/// Create an account. Registering does not sign in.
pub async fn register(
    storefront: &Storefront,
    first_name: String,
    last_name: String,
    email: Email,
    password: String,
) -> Result<(), ClientError> {
    let registration = storefront
        .session()
        .register(&RegistrationRequest {
            first_name,
            last_name,
            email,
            password,
            shipping_address: None,
            phone: None,
        })
        .await?;

    tracing::info!(
        "Account created: {} (id: {}). Sign in with `vitrine login`.",
        registration.email,
        registration.id
    );
    Ok(())
}

/// Show the canonical profile; falls back to the stored session when the
/// profile fetch is not possible.
pub async fn whoami(storefront: &Storefront) -> Result<(), ClientError> {
    if !storefront.session().is_logged_in() {
        tracing::info!("Not signed in");
        return Ok(());
    }

    let user = storefront.session().current_profile().await?;
    let name = match (&user.first_name, &user.last_name) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (Some(first), None) => first.clone(),
        _ => user.username.clone(),
    };

    tracing::info!("Signed in as {name} <{}> (id: {})", user.username, user.id);
    if storefront.session().is_admin() {
        tracing::info!("Role: ADMIN");
    }
    Ok(())
}

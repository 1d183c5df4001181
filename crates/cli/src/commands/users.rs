//! Administrative user directory commands.

use vitrine_client::types::ProfileRecord;
use vitrine_client::{ClientError, Storefront};
use vitrine_core::{Role, UserId};

/// List registered users (admin).
pub async fn list(storefront: &Storefront) -> Result<(), ClientError> {
    for user in storefront.users().list_users().await? {
        display(&user);
    }
    Ok(())
}

/// Show one user (admin).
pub async fn show(storefront: &Storefront, id: UserId) -> Result<(), ClientError> {
    let user = storefront.users().user_by_id(id).await?;
    display(&user);
    if let Some(address) = &user.shipping_address {
        tracing::info!("  ships to: {address}");
    }
    Ok(())
}

/// Change a user's role (admin).
pub async fn set_role(storefront: &Storefront, id: UserId, role: Role) -> Result<(), ClientError> {
    let user = storefront.users().set_role(id, role).await?;
    tracing::info!("User {} is now {}", user.email, user.role);
    Ok(())
}

/// Delete a user (admin).
pub async fn delete(storefront: &Storefront, id: UserId) -> Result<(), ClientError> {
    storefront.users().delete_user(id).await?;
    tracing::info!("Deleted user #{id}");
    Ok(())
}

fn display(user: &ProfileRecord) {
    let name = match (&user.first_name, &user.last_name) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (Some(first), None) => first.clone(),
        _ => user.email.to_string(),
    };
    tracing::info!("#{} {} <{}> ({})", user.id, name, user.email, user.role);
}

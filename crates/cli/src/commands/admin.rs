//! Admin user management commands.

use clementine_core::{Email, Role};

use clementine_api::db::users::UserRepository;
use clementine_api::services::auth;

use super::{CommandError, connect};

/// Create an admin user, or promote an existing user to admin.
///
/// # Errors
///
/// Returns `CommandError::InvalidInput` for a malformed email or weak
/// password, `CommandError` variants for database failures.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    if name.trim().is_empty() {
        return Err(CommandError::InvalidInput("name cannot be empty".to_owned()));
    }

    let password_hash = auth::hash_password(password)?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .upsert_with_role(&email, name, &password_hash, Role::Admin)
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Admin user ready");

    Ok(())
}

//! Authentication service.
//!
//! Registration, login and password changes. Passwords are hashed with
//! argon2id (salted, adaptive); login failure is a single
//! [`AuthError::InvalidCredentials`] regardless of whether the email or the
//! password was wrong.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use clementine_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with the `User` role and stamp their first
    /// login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        phone: Option<&str>,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, name, phone, &password_hash, Role::User)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        self.users.touch_last_login(user.id).await?;

        // Return the row with the stamped login time
        let refreshed = self.users.get_by_id(user.id).await?;
        Ok(refreshed.unwrap_or(user))
    }

    /// Login with email and password.
    ///
    /// Deactivated accounts fail even with correct credentials. A
    /// successful login stamps `last_login_at`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::AccountDeactivated` for a deactivated account.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        self.users.touch_last_login(user.id).await?;

        // Return the row with the stamped login time
        let refreshed = self.users.get_by_id(user.id).await?;
        Ok(refreshed.unwrap_or(user))
    }

    /// Re-authenticate a user for token refresh.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user no longer exists.
    /// Returns `AuthError::AccountDeactivated` if the account was deactivated.
    pub async fn refresh_lookup(&self, user_id: UserId) -> Result<User, AuthError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        Ok(user)
    }

    /// Change a user's password after verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CurrentPasswordMismatch` if the current password
    /// is wrong, `AuthError::WeakPassword` if the new one is too short.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let (_, password_hash) = self
            .users
            .get_with_password_hash_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(current_password, &password_hash)
            .map_err(|_| AuthError::CurrentPasswordMismatch)?;

        validate_password(new_password)?;
        let new_hash = hash_password(new_password)?;
        self.users.update_password(user_id, &new_hash).await?;

        Ok(())
    }
}

/// Validate password requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the hash is unreadable or the
/// password doesn't match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

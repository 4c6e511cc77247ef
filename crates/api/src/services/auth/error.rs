//! Authentication error types.

use thiserror::Error;

use clementine_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// `InvalidCredentials` deliberately covers both "no such user" and "wrong
/// password" so the two are indistinguishable to callers.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password combination is wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists and the credentials are right, but the account
    /// has been deactivated.
    #[error("account is deactivated")]
    AccountDeactivated,

    /// A user with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Email format is invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password doesn't meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// The current password supplied to a password change is wrong.
    #[error("current password is incorrect")]
    CurrentPasswordMismatch,

    /// Password hashing failed.
    #[error("password hashing error: {0}")]
    PasswordHash(String),

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

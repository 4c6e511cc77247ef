//! Unified error handling for the API.
//!
//! Provides a unified `AppError` type that maps the error taxonomy to HTTP
//! statuses with a JSON `{"message": ...}` body. All route handlers should
//! return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::tokens::TokenError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input, rejected before touching storage.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A business rule was violated (insufficient stock, empty cart,
    /// deleting a referenced entity, ...).
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Bearer token was missing, malformed, or failed validation.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the role or ownership required.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with full detail before hiding them from clients
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "Request error");
        }

        let status = match &self {
            Self::Validation(_) | Self::BusinessRule(_) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                AuthError::Repository(_) | AuthError::PasswordHash(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Token(_) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Validation(msg) | Self::BusinessRule(msg) => msg.clone(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::AccountDeactivated => "Account is deactivated".to_string(),
                AuthError::UserAlreadyExists => {
                    "User with this email already exists".to_string()
                }
                AuthError::InvalidEmail(e) => e.to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::CurrentPasswordMismatch => "Current password is incorrect".to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash(_) => {
                    tracing::error!(error = %err, "Auth internal error");
                    "Internal server error".to_string()
                }
            },
            Self::Token(TokenError::Expired) => "Token expired".to_string(),
            Self::Token(_) => "Invalid token".to_string(),
            Self::Unauthorized(msg) | Self::Forbidden(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BusinessRule("Cart is empty".to_string());
        assert_eq!(err.to_string(), "Business rule violation: Cart is empty");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("bad input".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::BusinessRule("Insufficient stock".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthorized("missing token".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("admins only".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::NotFound("order".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_errors_map_to_bad_request() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::AccountDeactivated)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        assert_eq!(
            get_status(AppError::Token(TokenError::Expired)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Token(TokenError::InvalidSignature)),
            StatusCode::UNAUTHORIZED
        );
    }
}

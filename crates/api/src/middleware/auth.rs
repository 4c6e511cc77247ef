//! Authentication extractors.
//!
//! Protected handlers take [`CurrentUser`] (any authenticated caller) or
//! [`RequireAdmin`] (admin role required) as an argument; the extractor
//! validates the bearer token and rejects the request otherwise.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use clementine_core::{Role, UserId};

use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller, as carried in access-token claims.
///
/// Identity comes entirely from the validated token; no database round
/// trip happens per request.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(user: CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    /// Whether the caller holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_owned()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_owned()))?;

        let claims = state.tokens().validate(token.trim())?;

        Ok(Self {
            id: claims.user_id()?,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        })
    }
}

/// Extractor that additionally requires the admin role.
///
/// # Example
///
/// ```rust,ignore
/// async fn admin_handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Administrator access required".to_owned()));
        }

        Ok(Self(user))
    }
}

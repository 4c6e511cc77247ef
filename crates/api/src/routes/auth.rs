//! Authentication route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::Role;

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::services::tokens::TokenPair;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/change-password", post(change_password))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i32(),
            email: user.email.into_inner(),
            name: user.name,
            role: user.role,
            phone: user.phone,
            department: user.department,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDto {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<TokenPair> for TokenDto {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserDto,
    pub tokens: TokenDto,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new user and return a usable token pair.
///
/// # Errors
///
/// Returns 400 for an invalid email, weak password, or duplicate email.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_owned()));
    }

    let auth = AuthService::new(state.pool());
    let user = auth
        .register(&body.email, &body.name, body.phone.as_deref(), &body.password)
        .await?;

    let tokens = state.tokens().issue(&user)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens: tokens.into(),
    }))
}

/// Login with email and password.
///
/// # Errors
///
/// Returns 400 for bad credentials or a deactivated account; the bad-email
/// and bad-password cases share one message.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&body.email, &body.password).await?;

    let tokens = state.tokens().issue(&user)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens: tokens.into(),
    }))
}

/// Re-issue a token pair.
///
/// The refresh token itself is only checked for presence; the caller is
/// identified by the bearer access token. See DESIGN.md for why this known
/// limitation is preserved.
///
/// # Errors
///
/// Returns 400 for a missing refresh token, 401 for an invalid bearer token
/// or a user that no longer exists or is deactivated.
pub async fn refresh(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>> {
    if body.refresh_token.is_empty() {
        return Err(AppError::Validation("Invalid refresh token".to_owned()));
    }

    let auth = AuthService::new(state.pool());
    let user = auth
        .refresh_lookup(user.id)
        .await
        .map_err(|_| AppError::Unauthorized("User not found or inactive".to_owned()))?;

    let tokens = state.tokens().issue(&user)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens: tokens.into(),
    }))
}

/// Current user details.
///
/// # Errors
///
/// Returns 404 if the user row no longer exists.
pub async fn me(user: CurrentUser, State(state): State<AppState>) -> Result<Json<UserDto>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(Json(user.into()))
}

/// Change the caller's password.
///
/// # Errors
///
/// Returns 400 if the current password is wrong or the new one is too weak.
pub async fn change_password(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool());
    auth.change_password(user.id, &body.current_password, &body.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_owned(),
    }))
}

/// Logout.
///
/// Refresh tokens are not stored server-side, so there is nothing to
/// revoke; the client discards its tokens.
pub async fn logout(_user: CurrentUser) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out successfully".to_owned(),
    })
}

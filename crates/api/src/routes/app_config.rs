//! Application configuration route handlers (key-value settings).

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::db::app_config::ConfigRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the config router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(set_many))
        .route("/{key}", get(show).put(set_one).delete(delete))
}

/// All settings as a key→value map.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list(State(state): State<AppState>) -> Result<Json<HashMap<String, String>>> {
    let configs = ConfigRepository::new(state.pool()).all().await?;
    Ok(Json(configs))
}

/// A single setting's value.
///
/// # Errors
///
/// Returns 404 if the key does not exist.
pub async fn show(State(state): State<AppState>, Path(key): Path<String>) -> Result<Json<String>> {
    let value = ConfigRepository::new(state.pool())
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("Config key not found".to_owned()))?;

    Ok(Json(value))
}

/// Bulk-upsert settings from a key→value map (admin).
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn set_many(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<HashMap<String, String>>,
) -> Result<StatusCode> {
    ConfigRepository::new(state.pool()).upsert_many(&body).await?;
    Ok(StatusCode::OK)
}

/// Upsert a single setting (admin).
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn set_one(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<String>,
) -> Result<StatusCode> {
    ConfigRepository::new(state.pool())
        .upsert(&key, &value, None)
        .await?;
    Ok(StatusCode::OK)
}

/// Delete a setting (admin).
///
/// # Errors
///
/// Returns 404 if the key does not exist.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    let deleted = ConfigRepository::new(state.pool()).delete(&key).await?;

    if !deleted {
        return Err(AppError::NotFound("Config key not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}

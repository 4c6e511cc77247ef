//! Category route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::CategoryId;

use crate::db::categories::CategoryRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Category;
use crate::state::AppState;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/all", get(list_all))
        .route("/{id}", get(show).put(update).delete(delete))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.as_i32(),
            name: category.name,
            description: category.description,
            image_url: category.image_url,
            is_active: category.is_active,
            sort_order: category.sort_order,
            product_count: category.product_count,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl CategoryRequest {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_owned()));
        }
        Ok(())
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Active categories with active-product counts.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CategoryDto>>> {
    let categories = CategoryRepository::new(state.pool()).list_active().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// All categories, inactive included (admin).
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryDto>>> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// Category detail.
///
/// # Errors
///
/// Returns 404 if no such category exists.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryDto>> {
    let category = CategoryRepository::new(state.pool())
        .get(CategoryId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_owned()))?;

    Ok(Json(category.into()))
}

/// Create a category (admin).
///
/// # Errors
///
/// Returns 400 for invalid fields.
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryDto>)> {
    body.validate()?;

    let category = CategoryRepository::new(state.pool())
        .create(
            &body.name,
            body.description.as_deref(),
            body.image_url.as_deref(),
            body.is_active,
            body.sort_order,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// Update a category (admin).
///
/// # Errors
///
/// Returns 404 if no such category exists, 400 for invalid fields.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<CategoryDto>> {
    body.validate()?;

    let category = CategoryRepository::new(state.pool())
        .update(
            CategoryId::new(id),
            &body.name,
            body.description.as_deref(),
            body.image_url.as_deref(),
            body.is_active,
            body.sort_order,
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_owned()))?;

    Ok(Json(category.into()))
}

/// Delete a category (admin). Blocked while any product references it.
///
/// # Errors
///
/// Returns 404 if no such category exists, 400 if products reference it.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let id = CategoryId::new(id);
    let categories = CategoryRepository::new(state.pool());

    if !categories.exists(id).await? {
        return Err(AppError::NotFound("Category not found".to_owned()));
    }

    if categories.has_products(id).await? {
        return Err(AppError::BusinessRule(
            "Cannot delete category that has products".to_owned(),
        ));
    }

    categories.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

//! Brand route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::BrandId;

use crate::db::brands::BrandRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Brand;
use crate::state::AppState;

/// Build the brands router.
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
pub struct BrandDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Brand> for BrandDto {
    fn from(brand: Brand) -> Self {
        Self {
            id: brand.id.as_i32(),
            name: brand.name,
            description: brand.description,
            logo_url: brand.logo_url,
            is_active: brand.is_active,
            sort_order: brand.sort_order,
            product_count: brand.product_count,
            created_at: brand.created_at,
            updated_at: brand.updated_at,
        }
    }
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandRequest {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl BrandRequest {
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

/// Active brands with active-product counts.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<BrandDto>>> {
    let brands = BrandRepository::new(state.pool()).list_active().await?;
    Ok(Json(brands.into_iter().map(Into::into).collect()))
}

/// All brands, inactive included (admin).
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<BrandDto>>> {
    let brands = BrandRepository::new(state.pool()).list_all().await?;
    Ok(Json(brands.into_iter().map(Into::into).collect()))
}

/// Brand detail.
///
/// # Errors
///
/// Returns 404 if no such brand exists.
pub async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<BrandDto>> {
    let brand = BrandRepository::new(state.pool())
        .get(BrandId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Brand not found".to_owned()))?;

    Ok(Json(brand.into()))
}

/// Create a brand (admin).
///
/// # Errors
///
/// Returns 400 for invalid fields.
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<BrandRequest>,
) -> Result<(StatusCode, Json<BrandDto>)> {
    body.validate()?;

    let brand = BrandRepository::new(state.pool())
        .create(
            &body.name,
            body.description.as_deref(),
            body.logo_url.as_deref(),
            body.is_active,
            body.sort_order,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(brand.into())))
}

/// Update a brand (admin).
///
/// # Errors
///
/// Returns 404 if no such brand exists, 400 for invalid fields.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<BrandRequest>,
) -> Result<Json<BrandDto>> {
    body.validate()?;

    let brand = BrandRepository::new(state.pool())
        .update(
            BrandId::new(id),
            &body.name,
            body.description.as_deref(),
            body.logo_url.as_deref(),
            body.is_active,
            body.sort_order,
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Brand not found".to_owned()))?;

    Ok(Json(brand.into()))
}

/// Delete a brand (admin). Blocked while any product references it.
///
/// # Errors
///
/// Returns 404 if no such brand exists, 400 if products reference it.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let id = BrandId::new(id);
    let brands = BrandRepository::new(state.pool());

    if !brands.exists(id).await? {
        return Err(AppError::NotFound("Brand not found".to_owned()));
    }

    if brands.has_products(id).await? {
        return Err(AppError::BusinessRule(
            "Cannot delete brand that has products".to_owned(),
        ));
    }

    brands.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

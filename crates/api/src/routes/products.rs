//! Product route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{BrandId, CategoryId, ProductId};

use crate::db::brands::BrandRepository;
use crate::db::categories::CategoryRepository;
use crate::db::products::{ProductFilters, ProductInput, ProductRepository, ProductSort};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::state::AppState;

use super::total_pages;

const DEFAULT_PAGE_SIZE: i64 = 20;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(delete))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category_id: Option<i32>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ProductListQuery {
    /// Convert the raw query into typed filters, rejecting unknown sort
    /// keys and orders.
    fn into_filters(self) -> Result<ProductFilters> {
        let mut sort = ProductSort::default();
        if let Some(raw) = &self.sort_by {
            sort.key = raw.parse().map_err(AppError::Validation)?;
        }
        if let Some(raw) = &self.sort_order {
            sort.order = raw.parse().map_err(AppError::Validation)?;
        }

        Ok(ProductFilters {
            category_id: self.category_id.map(CategoryId::new),
            brand: self.brand,
            min_price: self.min_price,
            max_price: self.max_price,
            is_active: self.is_active,
            is_featured: self.is_featured,
            search: self.search,
            sort,
            page: self.page.unwrap_or(1).max(1),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: i32,
    pub category_name: String,
    pub brand: Option<String>,
    pub brand_id: Option<i32>,
    pub sku: Option<String>,
    pub stock: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub discount_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_id: i32,
    pub created_by_name: String,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name,
            description: product.description,
            price: product.price,
            category_id: product.category_id.as_i32(),
            category_name: product.category_name,
            brand: product.brand,
            brand_id: product.brand_id.map(|id| id.as_i32()),
            sku: product.sku,
            stock: product.stock,
            image_url: product.image_url,
            is_active: product.is_active,
            is_featured: product.is_featured,
            discount_price: product.discount_price,
            created_at: product.created_at,
            updated_at: product.updated_at,
            created_by_id: product.created_by_id.as_i32(),
            created_by_name: product.created_by_name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<ProductDto>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: i32,
    pub brand: Option<String>,
    pub brand_id: Option<i32>,
    pub sku: Option<String>,
    pub stock: i32,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub discount_price: Option<Decimal>,
}

impl ProductRequest {
    /// Validate field-level constraints and produce repository input.
    fn into_input(self) -> Result<ProductInput> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_owned()));
        }
        if self.price <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Price must be greater than zero".to_owned(),
            ));
        }
        if self.stock < 0 {
            return Err(AppError::Validation(
                "Stock cannot be negative".to_owned(),
            ));
        }

        Ok(ProductInput {
            name: self.name,
            description: self.description,
            price: self.price,
            category_id: CategoryId::new(self.category_id),
            brand: self.brand,
            brand_id: self.brand_id.map(BrandId::new),
            sku: self.sku,
            stock: self.stock,
            image_url: self.image_url,
            is_active: self.is_active,
            is_featured: self.is_featured,
            discount_price: self.discount_price,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Filtered, sorted, paginated product listing.
///
/// # Errors
///
/// Returns 400 for an unrecognised sort key or order.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductListResponse>> {
    let filters = query.into_filters()?;
    let (products, total_count) = ProductRepository::new(state.pool()).list(&filters).await?;

    Ok(Json(ProductListResponse {
        products: products.into_iter().map(Into::into).collect(),
        total_count,
        page: filters.page,
        page_size: filters.page_size,
        total_pages: total_pages(total_count, filters.page_size),
    }))
}

/// Product detail.
///
/// # Errors
///
/// Returns 404 if no such product exists.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductDto>> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(product.into()))
}

/// Create a product (admin).
///
/// # Errors
///
/// Returns 400 for invalid fields or an unknown category/brand.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductDto>)> {
    let input = body.into_input()?;
    validate_references(&state, &input).await?;

    let product = ProductRepository::new(state.pool())
        .create(&input, admin.id)
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Update a product (admin).
///
/// # Errors
///
/// Returns 404 if no such product exists, 400 for invalid fields or an
/// unknown category/brand.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<ProductRequest>,
) -> Result<Json<ProductDto>> {
    let input = body.into_input()?;
    validate_references(&state, &input).await?;

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &input)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(product.into()))
}

/// Delete a product (admin). Blocked while any order references it.
///
/// # Errors
///
/// Returns 404 if no such product exists, 400 if it has been ordered.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let id = ProductId::new(id);
    let products = ProductRepository::new(state.pool());

    if products.get(id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    if products.has_order_items(id).await? {
        return Err(AppError::BusinessRule(
            "Cannot delete product that has been ordered".to_owned(),
        ));
    }

    products.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Check that the referenced category (and brand, when given) exist.
async fn validate_references(state: &AppState, input: &ProductInput) -> Result<()> {
    if !CategoryRepository::new(state.pool())
        .exists(input.category_id)
        .await?
    {
        return Err(AppError::BusinessRule("Category not found".to_owned()));
    }

    if let Some(brand_id) = input.brand_id
        && !BrandRepository::new(state.pool()).exists(brand_id).await?
    {
        return Err(AppError::BusinessRule("Brand not found".to_owned()));
    }

    Ok(())
}

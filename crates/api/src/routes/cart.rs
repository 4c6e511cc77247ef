//! Cart route handlers. All routes are scoped to the authenticated caller.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{CartItemId, ProductId};

use crate::db::app_config::ConfigRepository;
use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{CartItemDetail, CartSummary};
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show).delete(clear))
        .route("/items", post(add_item))
        .route("/items/{id}", put(update_item).delete(remove_item))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDto {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub product_price: Decimal,
    pub product_discount_price: Option<Decimal>,
    pub quantity: i32,
    pub total_price: Decimal,
    pub available_stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CartItemDetail> for CartItemDto {
    fn from(item: CartItemDetail) -> Self {
        let total_price = item.line_total();
        Self {
            id: item.id.as_i32(),
            product_id: item.product_id.as_i32(),
            product_name: item.product_name,
            product_image_url: item.product_image_url,
            product_price: item.product_price,
            product_discount_price: item.product_discount_price,
            quantity: item.quantity,
            total_price,
            available_stock: item.available_stock,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummaryDto {
    pub items: Vec<CartItemDto>,
    pub total_items: i32,
    pub sub_total: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl From<CartSummary> for CartSummaryDto {
    fn from(summary: CartSummary) -> Self {
        Self {
            total_items: summary.total_items,
            sub_total: summary.sub_total,
            tax: summary.tax,
            total: summary.total,
            items: summary.items.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// The caller's cart with live product data and computed totals.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn show(user: CurrentUser, State(state): State<AppState>) -> Result<Json<CartSummaryDto>> {
    let items = CartRepository::new(state.pool()).items(user.id).await?;
    let tax_rate = ConfigRepository::new(state.pool()).tax_rate().await?;

    Ok(Json(CartSummary::from_items(items, tax_rate).into()))
}

/// Add a product to the cart, incrementing an existing line if present.
/// The resulting quantity is bounded by live stock.
///
/// # Errors
///
/// Returns 400 if the product is missing/inactive, the quantity is not
/// positive, or stock would be exceeded.
pub async fn add_item(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartItemDto>)> {
    if body.quantity < 1 {
        return Err(AppError::Validation(
            "Quantity must be at least 1".to_owned(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(body.product_id))
        .await?;

    let Some(product) = product.filter(|p| p.is_active) else {
        return Err(AppError::BusinessRule(
            "Product not found or inactive".to_owned(),
        ));
    };

    if product.stock < body.quantity {
        return Err(AppError::BusinessRule("Insufficient stock".to_owned()));
    }

    let cart = CartRepository::new(state.pool());

    let (item_id, status) = match cart.find_by_product(user.id, product.id).await? {
        Some((existing_id, existing_quantity)) => {
            let new_quantity = existing_quantity + body.quantity;
            if product.stock < new_quantity {
                return Err(AppError::BusinessRule("Insufficient stock".to_owned()));
            }
            cart.update_quantity(existing_id, user.id, new_quantity)
                .await?;
            (existing_id, StatusCode::OK)
        }
        None => {
            let id = cart.insert(user.id, product.id, body.quantity).await?;
            (id, StatusCode::CREATED)
        }
    };

    let item = cart
        .get_item(item_id, user.id)
        .await?
        .ok_or_else(|| AppError::Internal("cart item vanished".to_owned()))?;

    Ok((status, Json(item.into())))
}

/// Set the quantity on one of the caller's cart lines, re-validated
/// against live stock.
///
/// # Errors
///
/// Returns 404 if the line doesn't exist or belongs to someone else,
/// 400 if the quantity is not positive or exceeds stock.
pub async fn update_item(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateCartItemRequest>,
) -> Result<Json<CartItemDto>> {
    if body.quantity < 1 {
        return Err(AppError::Validation(
            "Quantity must be at least 1".to_owned(),
        ));
    }

    let id = CartItemId::new(id);
    let cart = CartRepository::new(state.pool());

    let item = cart
        .get_item(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_owned()))?;

    if item.available_stock < body.quantity {
        return Err(AppError::BusinessRule("Insufficient stock".to_owned()));
    }

    cart.update_quantity(id, user.id, body.quantity).await?;

    let item = cart
        .get_item(id, user.id)
        .await?
        .ok_or_else(|| AppError::Internal("cart item vanished".to_owned()))?;

    Ok(Json(item.into()))
}

/// Remove one of the caller's cart lines.
///
/// # Errors
///
/// Returns 404 if the line doesn't exist or belongs to someone else.
pub async fn remove_item(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let removed = CartRepository::new(state.pool())
        .remove(CartItemId::new(id), user.id)
        .await?;

    if !removed {
        return Err(AppError::NotFound("Cart item not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Remove every line in the caller's cart.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn clear(user: CurrentUser, State(state): State<AppState>) -> Result<StatusCode> {
    CartRepository::new(state.pool()).clear(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

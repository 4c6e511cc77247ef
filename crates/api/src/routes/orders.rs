//! Order route handlers: checkout, listing, detail, status updates.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{OrderId, OrderStatus, PaymentStatus, UserId};

use crate::db::app_config::ConfigRepository;
use crate::db::orders::{
    CheckoutDetails, OrderFilters, OrderRepository, OrderSort, PlaceOrderError,
};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::{Order, OrderItem};
use crate::state::AppState;

use super::total_pages;

const DEFAULT_PAGE_SIZE: i64 = 20;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
        .route("/{id}/status", put(update_status))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    /// Admin-only filter; ignored for regular callers, who always see
    /// their own orders.
    pub user_id: Option<i32>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl OrderListQuery {
    /// Convert the raw query into typed filters, scoping non-admin callers
    /// to their own orders and rejecting unknown statuses and sort keys.
    fn into_filters(self, caller: &CurrentUser) -> Result<OrderFilters> {
        let user_id = if caller.is_admin() {
            self.user_id.map(UserId::new)
        } else {
            Some(caller.id)
        };

        let status = self
            .status
            .as_deref()
            .map(str::parse::<OrderStatus>)
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let payment_status = self
            .payment_status
            .as_deref()
            .map(str::parse::<PaymentStatus>)
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut sort = OrderSort::default();
        if let Some(raw) = &self.sort_by {
            sort.key = raw.parse().map_err(AppError::Validation)?;
        }
        if let Some(raw) = &self.sort_order {
            sort.order = raw.parse().map_err(AppError::Validation)?;
        }

        Ok(OrderFilters {
            user_id,
            status,
            payment_status,
            from_date: self.from_date,
            to_date: self.to_date,
            search: self.search,
            sort,
            page: self.page.unwrap_or(1).max(1),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub payment_id: Option<String>,
    pub shipping_name: String,
    pub shipping_address: String,
    pub shipping_address2: Option<String>,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_zip: String,
    pub shipping_country: String,
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    fn into_details(self) -> Result<CheckoutDetails> {
        let required = [
            ("shippingName", &self.shipping_name),
            ("shippingAddress", &self.shipping_address),
            ("shippingCity", &self.shipping_city),
            ("shippingState", &self.shipping_state),
            ("shippingZip", &self.shipping_zip),
            ("shippingCountry", &self.shipping_country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{field} is required")));
            }
        }

        Ok(CheckoutDetails {
            payment_id: self.payment_id,
            shipping_name: self.shipping_name,
            shipping_address: self.shipping_address,
            shipping_address2: self.shipping_address2,
            shipping_city: self.shipping_city,
            shipping_state: self.shipping_state,
            shipping_zip: self.shipping_zip,
            shipping_country: self.shipping_country,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl From<OrderItem> for OrderItemDto {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id.as_i32(),
            product_id: item.product_id.as_i32(),
            product_name: item.product_name,
            product_image_url: item.product_image_url,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: i32,
    pub order_number: String,
    pub user_id: i32,
    pub user_name: String,
    pub user_email: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub shipping_name: String,
    pub shipping_address: String,
    pub shipping_address2: Option<String>,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_zip: String,
    pub shipping_country: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub order_items: Vec<OrderItemDto>,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.as_i32(),
            order_number: order.order_number,
            user_id: order.user_id.as_i32(),
            user_name: order.user_name,
            user_email: order.user_email,
            total_amount: order.total_amount,
            status: order.status,
            payment_id: order.payment_id,
            payment_status: order.payment_status,
            shipping_name: order.shipping_name,
            shipping_address: order.shipping_address,
            shipping_address2: order.shipping_address2,
            shipping_city: order.shipping_city,
            shipping_state: order.shipping_state,
            shipping_zip: order.shipping_zip,
            shipping_country: order.shipping_country,
            notes: order.notes,
            created_at: order.created_at,
            updated_at: order.updated_at,
            order_items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    pub orders: Vec<OrderDto>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Filtered, sorted, paginated order listing. Non-admin callers only ever
/// see their own orders.
///
/// # Errors
///
/// Returns 400 for an unknown status value, sort key or order.
pub async fn list(
    user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>> {
    let filters = query.into_filters(&user)?;
    let (orders, total_count) = OrderRepository::new(state.pool()).list(&filters).await?;

    Ok(Json(OrderListResponse {
        orders: orders.into_iter().map(Into::into).collect(),
        total_count,
        page: filters.page,
        page_size: filters.page_size,
        total_pages: total_pages(total_count, filters.page_size),
    }))
}

/// Order detail. Non-admin callers may only fetch their own orders.
///
/// # Errors
///
/// Returns 404 for an unknown order, 403 when a non-admin requests another
/// user's order.
pub async fn show(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderDto>> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    if !user.is_admin() && order.user_id != user.id {
        return Err(AppError::Forbidden(
            "You do not have access to this order".to_owned(),
        ));
    }

    Ok(Json(order.into()))
}

/// Place an order from the caller's cart. All-or-nothing: stock is
/// validated, the order and its item snapshots are written, stock is
/// decremented and the cart cleared in a single transaction.
///
/// # Errors
///
/// Returns 400 for an empty cart, insufficient stock, or missing shipping
/// fields.
pub async fn create(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDto>)> {
    let details = body.into_details()?;
    let tax_rate = ConfigRepository::new(state.pool()).tax_rate().await?;

    let order = OrderRepository::new(state.pool())
        .create_from_cart(user.id, &details, tax_rate)
        .await
        .map_err(|e| match e {
            PlaceOrderError::EmptyCart => AppError::BusinessRule("Cart is empty".to_owned()),
            PlaceOrderError::InsufficientStock(name) => {
                AppError::BusinessRule(format!("Insufficient stock for {name}"))
            }
            PlaceOrderError::Repository(err) => AppError::Database(err),
        })?;

    tracing::info!(order_number = %order.order_number, user_id = %user.id, "Order placed");

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// Overwrite an order's status and optionally its notes (admin). The
/// status value must belong to the closed status set, but any status may
/// follow any other.
///
/// # Errors
///
/// Returns 404 for an unknown order, 400 for an unknown status value.
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderDto>> {
    let status: OrderStatus = body
        .status
        .parse()
        .map_err(|e: clementine_core::StatusParseError| AppError::Validation(e.to_string()))?;

    // Only overwrite notes when the request carries a non-empty value.
    let notes = body.notes.as_deref().filter(|n| !n.trim().is_empty());

    let order = OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), status, notes)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    Ok(Json(order.into()))
}

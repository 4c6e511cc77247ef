//! Order repository, including the checkout workflow.
//!
//! Checkout is a single transaction: validate the cart, write the order
//! header and item snapshots, decrement stock, clear the cart. Any failure
//! rolls the whole transaction back; no partial order is ever observable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use clementine_core::{OrderId, OrderStatus, PaymentStatus, UserId};

use super::{RepositoryError, SortOrder};
use crate::models::{CartItemDetail, Order, OrderItem, OrderTotals};

/// Columns selected for every order-header read.
const ORDER_COLUMNS: &str = "o.id, o.order_number, o.user_id, u.name AS user_name, \
     u.email AS user_email, o.total_amount, o.status, o.payment_id, o.payment_status, \
     o.shipping_name, o.shipping_address, o.shipping_address2, o.shipping_city, \
     o.shipping_state, o.shipping_zip, o.shipping_country, o.notes, \
     o.created_at, o.updated_at";

/// Join required to hydrate an order header.
const ORDER_JOINS: &str = " FROM orders o JOIN users u ON u.id = o.user_id";

/// SQL selecting the columns of an [`OrderItem`].
const ORDER_ITEM_COLUMNS: &str = "oi.id, oi.product_id, oi.product_name, \
     oi.product_image_url, oi.quantity, oi.unit_price, oi.total_price";

/// The closed set of order sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSortKey {
    #[default]
    Created,
    Total,
    Status,
}

impl std::str::FromStr for OrderSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("created") {
            Ok(Self::Created)
        } else if s.eq_ignore_ascii_case("total") {
            Ok(Self::Total)
        } else if s.eq_ignore_ascii_case("status") {
            Ok(Self::Status)
        } else {
            Err(format!("invalid sort key: {s}"))
        }
    }
}

/// An order sort: key plus direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderSort {
    pub key: OrderSortKey,
    pub order: SortOrder,
}

impl OrderSort {
    /// The `ORDER BY` clause for this sort. Static strings only.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match (self.key, self.order) {
            (OrderSortKey::Created, SortOrder::Asc) => "o.created_at ASC",
            (OrderSortKey::Created, SortOrder::Desc) => "o.created_at DESC",
            (OrderSortKey::Total, SortOrder::Asc) => "o.total_amount ASC",
            (OrderSortKey::Total, SortOrder::Desc) => "o.total_amount DESC",
            (OrderSortKey::Status, SortOrder::Asc) => "o.status ASC",
            (OrderSortKey::Status, SortOrder::Desc) => "o.status DESC",
        }
    }
}

/// Filters for the order listing.
#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    /// Restrict to a single user's orders. Always set for non-admin
    /// callers; optional for admins.
    pub user_id: Option<UserId>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    /// Substring match across order number, user name and user email.
    pub search: Option<String>,
    pub sort: OrderSort,
    pub page: i64,
    pub page_size: i64,
}

/// Shipping and payment details captured at checkout.
#[derive(Debug, Clone)]
pub struct CheckoutDetails {
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

/// Failures specific to the checkout workflow.
#[derive(Debug, thiserror::Error)]
pub enum PlaceOrderError {
    /// The caller's cart has no lines.
    #[error("cart is empty")]
    EmptyCart,
    /// A cart line asks for more units than the product has in stock.
    /// Carries the offending product's name.
    #[error("insufficient stock for {0}")]
    InsufficientStock(String),
    /// The underlying storage operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// An order header row as stored, before items are attached.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    user_id: UserId,
    user_name: String,
    user_email: String,
    total_amount: Decimal,
    status: OrderStatus,
    payment_id: Option<String>,
    payment_status: Option<PaymentStatus>,
    shipping_name: String,
    shipping_address: String,
    shipping_address2: Option<String>,
    shipping_city: String,
    shipping_state: String,
    shipping_zip: String,
    shipping_country: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            user_id: self.user_id,
            user_name: self.user_name,
            user_email: self.user_email,
            total_amount: self.total_amount,
            status: self.status,
            payment_id: self.payment_id,
            payment_status: self.payment_status,
            shipping_name: self.shipping_name,
            shipping_address: self.shipping_address,
            shipping_address2: self.shipping_address2,
            shipping_city: self.shipping_city,
            shipping_state: self.shipping_state,
            shipping_zip: self.shipping_zip,
            shipping_country: self.shipping_country,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        }
    }
}

/// An order item row tagged with its order, for batched loading.
#[derive(sqlx::FromRow)]
struct TaggedItemRow {
    order_id: OrderId,
    #[sqlx(flatten)]
    item: OrderItem,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders matching the filters, returning the page of orders
    /// (items attached) and the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filters: &OrderFilters,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        let mut count_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM orders o JOIN users u ON u.id = o.user_id WHERE TRUE",
        );
        push_filters(&mut count_query, filters);
        let total_count: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {ORDER_COLUMNS}{ORDER_JOINS} WHERE TRUE"));
        push_filters(&mut query, filters);
        query.push(" ORDER BY ");
        query.push(filters.sort.order_by());
        query.push(" LIMIT ");
        query.push_bind(filters.page_size);
        query.push(" OFFSET ");
        query.push_bind((filters.page - 1) * filters.page_size);

        let rows = query.build_query_as::<OrderRow>().fetch_all(self.pool).await?;

        // Attach items for the whole page in one round trip.
        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let item_rows = sqlx::query_as::<_, TaggedItemRow>(&format!(
            "SELECT oi.order_id, {ORDER_ITEM_COLUMNS}
             FROM order_items oi
             WHERE oi.order_id = ANY($1)
             ORDER BY oi.id"
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_order: std::collections::HashMap<i32, Vec<OrderItem>> =
            std::collections::HashMap::new();
        for row in item_rows {
            items_by_order
                .entry(row.order_id.as_i32())
                .or_default()
                .push(row.item);
        }

        let orders = rows
            .into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id.as_i32()).unwrap_or_default();
                row.into_order(items)
            })
            .collect();

        Ok((orders, total_count))
    }

    /// Get a single order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS}{ORDER_JOINS} WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS}
             FROM order_items oi
             WHERE oi.order_id = $1
             ORDER BY oi.id"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(row.into_order(items)))
    }

    /// Convert the user's cart into an order, all-or-nothing.
    ///
    /// One transaction covering: cart load, stock validation, order header
    /// insert, per-item snapshot insert, guarded stock decrement, cart
    /// clear. The decrement (`UPDATE ... SET stock = stock - qty WHERE
    /// stock >= qty`) re-checks stock at write time, so two concurrent
    /// checkouts cannot both take the last units; the loser rolls back
    /// with [`PlaceOrderError::InsufficientStock`].
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::EmptyCart` if the cart has no lines,
    /// `PlaceOrderError::InsufficientStock` when a line exceeds live stock,
    /// or `PlaceOrderError::Repository` for storage failures.
    pub async fn create_from_cart(
        &self,
        user_id: UserId,
        details: &CheckoutDetails,
        tax_rate: Decimal,
    ) -> Result<Order, PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let cart_items = sqlx::query_as::<_, CartItemDetail>(
            r"
            SELECT ci.id, ci.product_id, p.name AS product_name,
                   p.image_url AS product_image_url, p.price AS product_price,
                   p.discount_price AS product_discount_price, ci.quantity,
                   p.stock AS available_stock, ci.created_at, ci.updated_at
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = $1
            ORDER BY ci.created_at
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if cart_items.is_empty() {
            return Err(PlaceOrderError::EmptyCart);
        }

        for item in &cart_items {
            if item.available_stock < item.quantity {
                return Err(PlaceOrderError::InsufficientStock(
                    item.product_name.clone(),
                ));
            }
        }

        let totals = OrderTotals::from_cart(&cart_items, tax_rate);
        let order_number = generate_order_number();

        let order_id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO orders
                (order_number, user_id, total_amount, status, payment_id, payment_status,
                 shipping_name, shipping_address, shipping_address2, shipping_city,
                 shipping_state, shipping_zip, shipping_country, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            ",
        )
        .bind(&order_number)
        .bind(user_id)
        .bind(totals.total)
        .bind(OrderStatus::Pending)
        .bind(&details.payment_id)
        // Payment is captured out-of-band before checkout is called.
        .bind(PaymentStatus::Completed)
        .bind(&details.shipping_name)
        .bind(&details.shipping_address)
        .bind(&details.shipping_address2)
        .bind(&details.shipping_city)
        .bind(&details.shipping_state)
        .bind(&details.shipping_zip)
        .bind(&details.shipping_country)
        .bind(&details.notes)
        .fetch_one(&mut *tx)
        .await?;

        for item in &cart_items {
            let unit_price = item.unit_price();
            sqlx::query(
                r"
                INSERT INTO order_items
                    (order_id, product_id, quantity, unit_price, total_price,
                     product_name, product_image_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(unit_price)
            .bind(item.line_total())
            .bind(&item.product_name)
            .bind(&item.product_image_url)
            .execute(&mut *tx)
            .await?;

            let decremented = sqlx::query(
                r"
                UPDATE products
                SET stock = stock - $1, updated_at = now()
                WHERE id = $2 AND stock >= $1
                ",
            )
            .bind(item.quantity)
            .bind(item.product_id)
            .execute(&mut *tx)
            .await?;

            if decremented.rows_affected() == 0 {
                // A concurrent checkout took the stock between our read and
                // this write; dropping the transaction rolls everything back.
                return Err(PlaceOrderError::InsufficientStock(
                    item.product_name.clone(),
                ));
            }
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(order_id)
            .await?
            .ok_or(PlaceOrderError::Repository(RepositoryError::NotFound))
    }

    /// Overwrite an order's status and (optionally) its notes.
    /// Returns the refreshed order, or `None` if it does not exist.
    ///
    /// Transitions are deliberately unconstrained: any status may follow
    /// any other.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        notes: Option<&str>,
    ) -> Result<Option<Order>, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET status = $1, notes = COALESCE($2, notes), updated_at = now()
            WHERE id = $3
            ",
        )
        .bind(status)
        .bind(notes)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }
}

/// Generate a human-readable order number: `ORD-<UTC date>-<8 hex chars>`.
///
/// Uniqueness is probabilistic; the unique index on `order_number` is the
/// backstop, and collisions are not retried.
#[must_use]
pub fn generate_order_number() -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase();

    format!("ORD-{}-{}", Utc::now().format("%Y%m%d"), suffix)
}

/// Append the filter conditions to a query ending in `WHERE TRUE`.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &OrderFilters) {
    if let Some(user_id) = filters.user_id {
        query.push(" AND o.user_id = ");
        query.push_bind(user_id);
    }
    if let Some(status) = filters.status {
        query.push(" AND o.status = ");
        query.push_bind(status);
    }
    if let Some(payment_status) = filters.payment_status {
        query.push(" AND o.payment_status = ");
        query.push_bind(payment_status);
    }
    if let Some(from_date) = filters.from_date {
        query.push(" AND o.created_at >= ");
        query.push_bind(from_date);
    }
    if let Some(to_date) = filters.to_date {
        query.push(" AND o.created_at <= ");
        query.push_bind(to_date);
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{search}%");
        query.push(" AND (o.order_number ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR u.name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR u.email ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();

        // ORD-yyyymmdd-XXXXXXXX
        assert_eq!(number.len(), 21);
        assert!(number.starts_with("ORD-"));

        let mut parts = number.split('-');
        assert_eq!(parts.next(), Some("ORD"));

        let date = parts.next().unwrap();
        assert_eq!(date.len(), 8);
        assert!(date.chars().all(|c| c.is_ascii_digit()));

        let suffix = parts.next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!suffix.chars().any(|c| c.is_ascii_lowercase()));

        assert_eq!(parts.next(), None);
    }

    #[test]
    fn test_order_numbers_differ() {
        assert_ne!(generate_order_number(), generate_order_number());
    }

    #[test]
    fn test_order_sort_key_parsing() {
        assert_eq!("created".parse::<OrderSortKey>().unwrap(), OrderSortKey::Created);
        assert_eq!("Total".parse::<OrderSortKey>().unwrap(), OrderSortKey::Total);
        assert_eq!("status".parse::<OrderSortKey>().unwrap(), OrderSortKey::Status);
        assert!("amount".parse::<OrderSortKey>().is_err());
    }

    #[test]
    fn test_default_sort_is_created_desc() {
        assert_eq!(OrderSort::default().order_by(), "o.created_at DESC");
    }
}

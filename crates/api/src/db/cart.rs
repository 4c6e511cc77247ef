//! Cart repository.
//!
//! Cart rows are keyed by (user, product); every read joins live product
//! data so prices and stock are always current.

use sqlx::PgPool;

use clementine_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::CartItemDetail;

/// Columns selected for every [`CartItemDetail`] read.
const CART_ITEM_COLUMNS: &str = "ci.id, ci.product_id, p.name AS product_name, \
     p.image_url AS product_image_url, p.price AS product_price, \
     p.discount_price AS product_discount_price, ci.quantity, \
     p.stock AS available_stock, ci.created_at, ci.updated_at";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All cart lines for a user, oldest first, with live product data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, user_id: UserId) -> Result<Vec<CartItemDetail>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItemDetail>(&format!(
            "SELECT {CART_ITEM_COLUMNS}
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.user_id = $1
             ORDER BY ci.created_at"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// A single cart line, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_item(
        &self,
        id: CartItemId,
        user_id: UserId,
    ) -> Result<Option<CartItemDetail>, RepositoryError> {
        let item = sqlx::query_as::<_, CartItemDetail>(&format!(
            "SELECT {CART_ITEM_COLUMNS}
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.id = $1 AND ci.user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(item)
    }

    /// The user's existing cart line for a product, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<(CartItemId, i32)>, RepositoryError> {
        let row: Option<(CartItemId, i32)> = sqlx::query_as(
            "SELECT id, quantity FROM cart_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Insert a new cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a line for this (user, product)
    /// already exists. Returns `RepositoryError::Database` for other errors.
    pub async fn insert(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItemId, RepositoryError> {
        let id: CartItemId = sqlx::query_scalar(
            "INSERT INTO cart_items (user_id, product_id, quantity)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("product already in cart".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(id)
    }

    /// Set the quantity on a cart line, scoped to its owner.
    /// Returns `false` if no such line exists for this user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_quantity(
        &self,
        id: CartItemId,
        user_id: UserId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = $1, updated_at = now()
             WHERE id = $2 AND user_id = $3",
        )
        .bind(quantity)
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a cart line, scoped to its owner.
    /// Returns `false` if no such line exists for this user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, id: CartItemId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every cart line belonging to the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

//! Category repository.

use sqlx::PgPool;

use clementine_core::CategoryId;

use super::RepositoryError;
use crate::models::Category;

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active categories with their active-product counts,
    /// ordered by sort order then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT c.id, c.name, c.description, c.image_url, c.is_active, c.sort_order,
                   COUNT(p.id) FILTER (WHERE p.is_active) AS product_count,
                   c.created_at, c.updated_at
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            WHERE c.is_active
            GROUP BY c.id
            ORDER BY c.sort_order, c.name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// List all categories, inactive included, with total product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT c.id, c.name, c.description, c.image_url, c.is_active, c.sort_order,
                   COUNT(p.id) AS product_count,
                   c.created_at, c.updated_at
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.sort_order, c.name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Get a single category by ID with its active-product count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            SELECT c.id, c.name, c.description, c.image_url, c.is_active, c.sort_order,
                   COUNT(p.id) FILTER (WHERE p.is_active) AS product_count,
                   c.created_at, c.updated_at
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            WHERE c.id = $1
            GROUP BY c.id
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    /// Whether a category with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Whether any product references this category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_products(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let has: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE category_id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(has)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        image_url: Option<&str>,
        is_active: bool,
        sort_order: i32,
    ) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO categories (name, description, image_url, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, image_url, is_active, sort_order,
                      0::bigint AS product_count, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(description)
        .bind(image_url)
        .bind(is_active)
        .bind(sort_order)
        .fetch_one(self.pool)
        .await?;

        Ok(category)
    }

    /// Update a category. Returns the refreshed row, or `None` if it
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: CategoryId,
        name: &str,
        description: Option<&str>,
        image_url: Option<&str>,
        is_active: bool,
        sort_order: i32,
    ) -> Result<Option<Category>, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE categories
            SET name = $1, description = $2, image_url = $3, is_active = $4,
                sort_order = $5, updated_at = now()
            WHERE id = $6
            ",
        )
        .bind(name)
        .bind(description)
        .bind(image_url)
        .bind(is_active)
        .bind(sort_order)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    /// Delete a category. Returns `false` if it did not exist.
    ///
    /// The caller is responsible for checking [`Self::has_products`] first;
    /// the foreign key will reject the delete otherwise.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

//! Brand repository.

use sqlx::PgPool;

use clementine_core::BrandId;

use super::RepositoryError;
use crate::models::Brand;

/// Repository for brand database operations.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active brands with their active-product counts,
    /// ordered by sort order then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Brand>, RepositoryError> {
        let brands = sqlx::query_as::<_, Brand>(
            r"
            SELECT b.id, b.name, b.description, b.logo_url, b.is_active, b.sort_order,
                   COUNT(p.id) FILTER (WHERE p.is_active) AS product_count,
                   b.created_at, b.updated_at
            FROM brands b
            LEFT JOIN products p ON p.brand_id = b.id
            WHERE b.is_active
            GROUP BY b.id
            ORDER BY b.sort_order, b.name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(brands)
    }

    /// List all brands, inactive included, with active-product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Brand>, RepositoryError> {
        let brands = sqlx::query_as::<_, Brand>(
            r"
            SELECT b.id, b.name, b.description, b.logo_url, b.is_active, b.sort_order,
                   COUNT(p.id) FILTER (WHERE p.is_active) AS product_count,
                   b.created_at, b.updated_at
            FROM brands b
            LEFT JOIN products p ON p.brand_id = b.id
            GROUP BY b.id
            ORDER BY b.sort_order, b.name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(brands)
    }

    /// Get a single brand by ID with its active-product count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BrandId) -> Result<Option<Brand>, RepositoryError> {
        let brand = sqlx::query_as::<_, Brand>(
            r"
            SELECT b.id, b.name, b.description, b.logo_url, b.is_active, b.sort_order,
                   COUNT(p.id) FILTER (WHERE p.is_active) AS product_count,
                   b.created_at, b.updated_at
            FROM brands b
            LEFT JOIN products p ON p.brand_id = b.id
            WHERE b.id = $1
            GROUP BY b.id
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(brand)
    }

    /// Whether a brand with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: BrandId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM brands WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(exists)
    }

    /// Whether any product references this brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_products(&self, id: BrandId) -> Result<bool, RepositoryError> {
        let has: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE brand_id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(has)
    }

    /// Create a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        logo_url: Option<&str>,
        is_active: bool,
        sort_order: i32,
    ) -> Result<Brand, RepositoryError> {
        let brand = sqlx::query_as::<_, Brand>(
            r"
            INSERT INTO brands (name, description, logo_url, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, logo_url, is_active, sort_order,
                      0::bigint AS product_count, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(description)
        .bind(logo_url)
        .bind(is_active)
        .bind(sort_order)
        .fetch_one(self.pool)
        .await?;

        Ok(brand)
    }

    /// Update a brand. Returns the refreshed row, or `None` if it
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: BrandId,
        name: &str,
        description: Option<&str>,
        logo_url: Option<&str>,
        is_active: bool,
        sort_order: i32,
    ) -> Result<Option<Brand>, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE brands
            SET name = $1, description = $2, logo_url = $3, is_active = $4,
                sort_order = $5, updated_at = now()
            WHERE id = $6
            ",
        )
        .bind(name)
        .bind(description)
        .bind(logo_url)
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

    /// Delete a brand. Returns `false` if it did not exist.
    ///
    /// The caller is responsible for checking [`Self::has_products`] first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: BrandId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

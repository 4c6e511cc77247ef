//! Product repository, including the filtered catalog listing.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use clementine_core::{BrandId, CategoryId, ProductId, UserId};

use super::{RepositoryError, SortOrder};
use crate::models::Product;

/// Columns selected for every [`Product`] read.
const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.category_id, \
     c.name AS category_name, p.brand, p.brand_id, p.sku, p.stock, p.image_url, \
     p.is_active, p.is_featured, p.discount_price, p.created_by_id, \
     u.name AS created_by_name, p.created_at, p.updated_at";

/// Joins required to hydrate a [`Product`].
const PRODUCT_JOINS: &str = " FROM products p \
     JOIN categories c ON c.id = p.category_id \
     JOIN users u ON u.id = p.created_by_id";

/// The closed set of product sort keys. Unrecognised keys are rejected at
/// the boundary rather than silently falling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSortKey {
    Name,
    Price,
    #[default]
    Created,
}

impl std::str::FromStr for ProductSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("name") {
            Ok(Self::Name)
        } else if s.eq_ignore_ascii_case("price") {
            Ok(Self::Price)
        } else if s.eq_ignore_ascii_case("created") {
            Ok(Self::Created)
        } else {
            Err(format!("invalid sort key: {s}"))
        }
    }
}

/// A product sort: key plus direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductSort {
    pub key: ProductSortKey,
    pub order: SortOrder,
}

impl ProductSort {
    /// The `ORDER BY` clause for this sort. Static strings only; no user
    /// input reaches the SQL text.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match (self.key, self.order) {
            (ProductSortKey::Name, SortOrder::Asc) => "p.name ASC",
            (ProductSortKey::Name, SortOrder::Desc) => "p.name DESC",
            (ProductSortKey::Price, SortOrder::Asc) => "p.price ASC",
            (ProductSortKey::Price, SortOrder::Desc) => "p.price DESC",
            (ProductSortKey::Created, SortOrder::Asc) => "p.created_at ASC",
            (ProductSortKey::Created, SortOrder::Desc) => "p.created_at DESC",
        }
    }
}

/// Filters for the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    pub category_id: Option<CategoryId>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub search: Option<String>,
    pub sort: ProductSort,
    pub page: i64,
    pub page_size: i64,
}

/// Field bundle for product create/update.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: CategoryId,
    pub brand: Option<String>,
    pub brand_id: Option<BrandId>,
    pub sku: Option<String>,
    pub stock: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub discount_price: Option<Decimal>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching the filters, returning the page of rows and
    /// the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filters: &ProductFilters,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products p WHERE TRUE");
        push_filters(&mut count_query, filters);
        let total_count: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS}{PRODUCT_JOINS} WHERE TRUE"));
        push_filters(&mut query, filters);
        query.push(" ORDER BY ");
        query.push(filters.sort.order_by());
        query.push(" LIMIT ");
        query.push_bind(filters.page_size);
        query.push(" OFFSET ");
        query.push_bind((filters.page - 1) * filters.page_size);

        let products = query.build_query_as::<Product>().fetch_all(self.pool).await?;

        Ok((products, total_count))
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS}{PRODUCT_JOINS} WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        input: &ProductInput,
        created_by: UserId,
    ) -> Result<Product, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO products
                (name, description, price, category_id, brand, brand_id, sku, stock,
                 image_url, is_active, is_featured, discount_price, created_by_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.category_id)
        .bind(&input.brand)
        .bind(input.brand_id)
        .bind(&input.sku)
        .bind(input.stock)
        .bind(&input.image_url)
        .bind(input.is_active)
        .bind(input.is_featured)
        .bind(input.discount_price)
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Update a product. Returns the refreshed row, or `None` if it
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Option<Product>, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $1, description = $2, price = $3, category_id = $4, brand = $5,
                brand_id = $6, sku = $7, stock = $8, image_url = $9, is_active = $10,
                is_featured = $11, discount_price = $12, updated_at = now()
            WHERE id = $13
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.category_id)
        .bind(&input.brand)
        .bind(input.brand_id)
        .bind(&input.sku)
        .bind(input.stock)
        .bind(&input.image_url)
        .bind(input.is_active)
        .bind(input.is_featured)
        .bind(input.discount_price)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    /// Whether any order item references this product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_order_items(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let has: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM order_items WHERE product_id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(has)
    }

    /// Delete a product. Returns `false` if it did not exist.
    ///
    /// The caller is responsible for checking [`Self::has_order_items`]
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Append the filter conditions to a query ending in `WHERE TRUE`.
///
/// Every value is bound; only fixed SQL fragments are pushed as text.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &ProductFilters) {
    if let Some(category_id) = filters.category_id {
        query.push(" AND p.category_id = ");
        query.push_bind(category_id);
    }
    if let Some(brand) = &filters.brand {
        query.push(" AND p.brand ILIKE ");
        query.push_bind(format!("%{brand}%"));
    }
    if let Some(min_price) = filters.min_price {
        query.push(" AND p.price >= ");
        query.push_bind(min_price);
    }
    if let Some(max_price) = filters.max_price {
        query.push(" AND p.price <= ");
        query.push_bind(max_price);
    }
    if let Some(is_active) = filters.is_active {
        query.push(" AND p.is_active = ");
        query.push_bind(is_active);
    }
    if let Some(is_featured) = filters.is_featured {
        query.push(" AND p.is_featured = ");
        query.push_bind(is_featured);
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{search}%");
        query.push(" AND (p.name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR p.description ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR p.brand ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}

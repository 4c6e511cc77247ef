//! Database operations for the Clementine `PostgreSQL` store.
//!
//! All SQL lives in the repository modules below; handlers never touch the
//! pool directly. Queries are runtime-bound (`query`, `query_as`,
//! `QueryBuilder`) so the crate builds without a live database.
//!
//! ## Tables
//!
//! - `users` - Accounts, password hashes, roles
//! - `categories` / `brands` - Catalog taxonomy
//! - `products` - Catalog products with stock
//! - `cart_items` - Per-user cart lines, unique per (user, product)
//! - `orders` / `order_items` - Immutable order snapshots
//! - `app_config` - Flat key-value settings
//!
//! # Schema setup
//!
//! The schema is created by the idempotent [`bootstrap`] module, invoked at
//! process start and via `clem-cli migrate`.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod app_config;
pub mod bootstrap;
pub mod brands;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(format!("invalid sort order: {s}"))
        }
    }
}

/// Errors produced by the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The targeted row does not exist.
    #[error("row not found")]
    NotFound,

    /// A stored value could not be interpreted.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

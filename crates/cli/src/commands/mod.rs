//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bootstrap error: {0}")]
    Bootstrap(#[from] clementine_api::db::bootstrap::BootstrapError),

    #[error("Repository error: {0}")]
    Repository(#[from] clementine_api::db::RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] clementine_api::services::auth::AuthError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Connect to the database named by `CLEMENTINE_DATABASE_URL`
/// (or `DATABASE_URL`).
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CLEMENTINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("CLEMENTINE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = clementine_api::db::create_pool(&SecretString::from(database_url)).await?;

    Ok(pool)
}

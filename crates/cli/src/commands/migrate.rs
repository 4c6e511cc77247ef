//! Schema migration command.
//!
//! Runs the same idempotent bootstrap the API binary runs at startup, so
//! a deployment can prepare the database before the first process starts.

use clementine_api::db::bootstrap;

use super::{CommandError, connect};

/// Create all tables and indexes if they do not exist yet.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a DDL
/// statement fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running schema bootstrap...");
    bootstrap::ensure_schema(&pool).await?;
    tracing::info!("Schema bootstrap complete");

    Ok(())
}

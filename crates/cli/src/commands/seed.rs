//! Seed command.

use clementine_api::db::bootstrap;

use super::{CommandError, connect};

/// Seed reference data on an empty database.
///
/// Ensures the schema first, then seeds. The seed is guarded by an
/// existence check on `users`, so re-running is a no-op.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a statement
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    bootstrap::ensure_schema(&pool).await?;
    tracing::info!("Seeding reference data...");
    bootstrap::seed(&pool).await?;
    tracing::info!("Seed complete");

    Ok(())
}

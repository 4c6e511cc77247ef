//! Application configuration repository (flat key-value settings).

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;

/// Tax rate applied when the `tax_rate` config key is absent or unparsable.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Repository for app-config database operations.
pub struct ConfigRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ConfigRepository<'a> {
    /// Create a new config repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All settings as a key→value map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all(&self) -> Result<HashMap<String, String>, RepositoryError> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM app_config")
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }

    /// A single setting's value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM app_config WHERE key = $1")
                .bind(key)
                .fetch_optional(self.pool)
                .await?;

        Ok(value)
    }

    /// Create or update a setting. The description, when given, is only
    /// written on first insert.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO app_config (key, value, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            ",
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Upsert every entry of a key→value map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn upsert_many(
        &self,
        entries: &HashMap<String, String>,
    ) -> Result<(), RepositoryError> {
        for (key, value) in entries {
            self.upsert(key, value, None).await?;
        }
        Ok(())
    }

    /// Delete a setting. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, key: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM app_config WHERE key = $1")
            .bind(key)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The tax rate used by the cart and checkout.
    ///
    /// Sourced from the `tax_rate` config key; falls back to
    /// [`DEFAULT_TAX_RATE`] when the key is missing or unparsable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tax_rate(&self) -> Result<Decimal, RepositoryError> {
        let raw = self.get("tax_rate").await?;
        Ok(parse_tax_rate(raw.as_deref()))
    }
}

/// Parse a stored tax rate, falling back to the default on bad input.
fn parse_tax_rate(raw: Option<&str>) -> Decimal {
    raw.and_then(|value| value.trim().parse::<Decimal>().ok())
        .unwrap_or(DEFAULT_TAX_RATE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_tax_rate_is_eight_percent() {
        assert_eq!(DEFAULT_TAX_RATE, Decimal::from_str("0.08").unwrap());
    }

    #[test]
    fn test_parse_tax_rate_from_config_value() {
        assert_eq!(
            parse_tax_rate(Some("0.10")),
            Decimal::from_str("0.10").unwrap()
        );
        assert_eq!(
            parse_tax_rate(Some(" 0.08 ")),
            Decimal::from_str("0.08").unwrap()
        );
    }

    #[test]
    fn test_parse_tax_rate_falls_back() {
        assert_eq!(parse_tax_rate(None), DEFAULT_TAX_RATE);
        assert_eq!(parse_tax_rate(Some("not-a-number")), DEFAULT_TAX_RATE);
        assert_eq!(parse_tax_rate(Some("")), DEFAULT_TAX_RATE);
    }
}

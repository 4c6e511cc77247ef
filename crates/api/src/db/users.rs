//! User repository for database operations.

use sqlx::PgPool;

use clementine_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::User;

/// Columns selected for every [`User`] read.
const USER_COLUMNS: &str = "id, email, name, role, phone, department, is_active, \
                            last_login_at, created_at, updated_at";

/// A user row together with its password hash.
#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Get a user and their password hash by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        phone: Option<&str>,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, phone, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(name)
        .bind(phone)
        .bind(password_hash)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(user)
    }

    /// Stamp the user's last-login timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn touch_last_login(&self, id: UserId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET last_login_at = now(), updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Replace the user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
                .bind(password_hash)
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Promote an existing user to a role, or create them with it.
    ///
    /// Used by `clem-cli admin create`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_with_role(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, password_hash, role)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (email)
             DO UPDATE SET role = EXCLUDED.role, updated_at = now()
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(role)
        .fetch_one(self.pool)
        .await?;

        Ok(user)
    }
}

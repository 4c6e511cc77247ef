//! User domain model.

use chrono::{DateTime, Utc};

use clementine_core::{Email, Role, UserId};

/// A registered storefront user.
///
/// The password hash is deliberately not part of this model; repositories
/// return it separately to the auth service when needed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

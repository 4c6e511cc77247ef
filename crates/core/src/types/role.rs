//! User role.

use serde::{Deserialize, Serialize};

/// Error returned when parsing a [`Role`] from a string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

/// User role with two permission levels.
///
/// Roles are stored as text in the database and carried in access-token
/// claims. Parsing is case-insensitive and happens exactly once at the
/// boundary; all later comparisons are enum equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Full access to catalog, order and configuration management.
    Admin,
    /// Regular storefront customer.
    #[default]
    User,
}

impl Role {
    /// Whether this role grants administrative access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Canonical string form, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("admin") {
            Ok(Self::Admin)
        } else if s.eq_ignore_ascii_case("user") {
            Ok(Self::User)
        } else {
            Err(RoleParseError(s.to_owned()))
        }
    }
}

// SQLx support (with postgres feature): roles are TEXT columns.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("User".parse::<Role>().unwrap(), Role::User);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("root".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_serde_canonical_form() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"Admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"User\"");
    }
}

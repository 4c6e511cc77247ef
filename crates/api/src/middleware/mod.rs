//! Request extractors for authentication and authorization.

pub mod auth;

pub use auth::{CurrentUser, RequireAdmin};

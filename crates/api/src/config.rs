//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CLEMENTINE_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to the generic `DATABASE_URL`)
//! - `CLEMENTINE_TOKEN_SECRET` - Access-token signing secret
//!   (min 32 chars, high entropy)
//!
//! ## Optional
//! - `CLEMENTINE_HOST` - Bind address (default: 127.0.0.1)
//! - `CLEMENTINE_PORT` - Listen port (default: 8080)
//! - `CLEMENTINE_TOKEN_ISSUER` - Token issuer claim (default: clementine-api)
//! - `CLEMENTINE_TOKEN_AUDIENCE` - Token audience claim (default: clementine-client)
//! - `CLEMENTINE_ACCESS_TOKEN_EXPIRY_MINUTES` - Access token lifetime (default: 15)
//! - `CLEMENTINE_CORS_ORIGINS` - Comma-separated allowed origins for the
//!   browser client (default: the Vite and CRA dev-server ports)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Access-token issuing configuration
    pub token: TokenConfig,
    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
}

/// Access-token issuing configuration.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC signing secret for access tokens
    pub secret: SecretString,
    /// `iss` claim stamped on and required from every token
    pub issuer: String,
    /// `aud` claim stamped on and required from every token
    pub audience: String,
    /// Access token lifetime in minutes
    pub access_token_expiry_minutes: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field(
                "access_token_expiry_minutes",
                &self.access_token_expiry_minutes,
            )
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CLEMENTINE_DATABASE_URL")?;
        let host = get_env_or_default("CLEMENTINE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CLEMENTINE_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("CLEMENTINE_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CLEMENTINE_PORT".to_string(), e.to_string())
            })?;

        let token = TokenConfig::from_env()?;

        let cors_origins = get_optional_env("CLEMENTINE_CORS_ORIGINS")
            .map_or_else(default_cors_origins, |raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            });

        Ok(Self {
            database_url,
            host,
            port,
            token,
            cors_origins,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl TokenConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = get_validated_secret("CLEMENTINE_TOKEN_SECRET")?;
        validate_secret_length(&secret, "CLEMENTINE_TOKEN_SECRET")?;

        let access_token_expiry_minutes =
            get_env_or_default("CLEMENTINE_ACCESS_TOKEN_EXPIRY_MINUTES", "15")
                .parse::<i64>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "CLEMENTINE_ACCESS_TOKEN_EXPIRY_MINUTES".to_string(),
                        e.to_string(),
                    )
                })?;

        Ok(Self {
            secret,
            issuer: get_env_or_default("CLEMENTINE_TOKEN_ISSUER", "clementine-api"),
            audience: get_env_or_default("CLEMENTINE_TOKEN_AUDIENCE", "clementine-client"),
            access_token_expiry_minutes,
        })
    }
}

/// Dev-server origins of the browser client (Vite and CRA defaults).
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        let result = validate_secret_strength("changeme123", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_secret_length_too_short() {
        let secret = SecretString::from("short");
        let result = validate_secret_length(&secret, "TEST_SECRET");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_length_valid() {
        let secret = SecretString::from("a".repeat(32));
        let result = validate_secret_length(&secret, "TEST_SECRET");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            token: TokenConfig {
                secret: SecretString::from("x".repeat(32)),
                issuer: "clementine-api".to_string(),
                audience: "clementine-client".to_string(),
                access_token_expiry_minutes: 15,
            },
            cors_origins: default_cors_origins(),
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_token_config_debug_redacts_secret() {
        let config = TokenConfig {
            secret: SecretString::from("super_secret_signing_key_value"),
            issuer: "clementine-api".to_string(),
            audience: "clementine-client".to_string(),
            access_token_expiry_minutes: 15,
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("clementine-api"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_signing_key_value"));
    }
}

//! Access-token signing and validation.
//!
//! Access tokens are compact JWTs: three base64url segments
//! (`header.claims.signature`) signed with HMAC-SHA256. Claims carry the
//! user's id, email, name and role plus issuer, audience and expiry, so
//! protected handlers never need a database round trip to identify the
//! caller.
//!
//! Refresh tokens are opaque random strings. They are **not** persisted or
//! validated against any store; `/auth/refresh` authenticates via the
//! bearer access token and only checks the refresh token for presence.
//! This mirrors the system's known limitation rather than fixing it —
//! see DESIGN.md.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use clementine_core::{Role, UserId};

use crate::config::TokenConfig;
use crate::models::User;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of a refresh token before encoding.
const REFRESH_TOKEN_BYTES: usize = 32;

/// Errors produced when validating a token.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenError {
    /// The token does not have three base64url segments of valid JSON.
    #[error("malformed token")]
    Malformed,
    /// The signature does not match the signing secret.
    #[error("invalid signature")]
    InvalidSignature,
    /// The token's expiry is in the past. No clock skew is tolerated.
    #[error("token expired")]
    Expired,
    /// The `iss` claim does not match this issuer.
    #[error("invalid issuer")]
    InvalidIssuer,
    /// The `aud` claim does not match this audience.
    #[error("invalid audience")]
    InvalidAudience,
}

/// Claims embedded in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string per JWT convention.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// The user id carried in `sub`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if `sub` is not an integer.
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| TokenError::Malformed)
    }
}

/// An issued token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and validates access tokens.
#[derive(Clone)]
pub struct TokenSigner {
    secret: SecretString,
    issuer: String,
    audience: String,
    access_token_ttl: Duration,
}

impl TokenSigner {
    /// Create a signer from configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_ttl: Duration::minutes(config.access_token_expiry_minutes),
        }
    }

    /// Issue an access/refresh token pair for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` only if claim serialization fails,
    /// which would indicate a bug rather than bad input.
    pub fn issue(&self, user: &User) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        let expires_at = now + self.access_token_ttl;

        let claims = Claims {
            sub: user.id.as_i32().to_string(),
            email: user.email.to_string(),
            name: user.name.clone(),
            role: user.role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(TokenPair {
            access_token: self.sign(&claims)?,
            refresh_token: generate_refresh_token(),
            expires_at,
        })
    }

    /// Validate an access token: signature, issuer, audience and expiry
    /// must all check out, with zero clock-skew tolerance.
    ///
    /// # Errors
    ///
    /// Returns the specific [`TokenError`] for whichever check failed.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.iss != self.issuer {
            return Err(TokenError::InvalidIssuer);
        }
        if claims.aud != self.audience {
            return Err(TokenError::InvalidAudience);
        }
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;
        let payload = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{header}.{payload}.{signature}"))
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"))
    }
}

/// Generate an opaque refresh token: 32 random bytes, base64-encoded.
#[must_use]
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clementine_core::Email;

    fn signer() -> TokenSigner {
        TokenSigner::new(&TokenConfig {
            secret: SecretString::from("kX9#mP2$vQ7!nR4@wT8%yU3^zA6&bC1*"),
            issuer: "clementine-api".to_string(),
            audience: "clementine-client".to_string(),
            access_token_expiry_minutes: 15,
        })
    }

    fn user() -> User {
        User {
            id: UserId::new(42),
            email: Email::parse("user@example.com").unwrap(),
            name: "Test User".to_string(),
            role: Role::User,
            phone: None,
            department: None,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let signer = signer();
        let pair = signer.issue(&user()).unwrap();

        let claims = signer.validate(&pair.access_token).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserId::new(42));
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.name, "Test User");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.iss, "clementine-api");
        assert_eq!(claims.aud, "clementine-client");
    }

    #[test]
    fn test_role_claim_matches_user_role() {
        let signer = signer();
        let mut admin = user();
        admin.role = Role::Admin;

        let pair = signer.issue(&admin).unwrap();
        let claims = signer.validate(&pair.access_token).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let signer = signer();
        let pair = signer.issue(&user()).unwrap();

        let mut segments: Vec<&str> = pair.access_token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(
            br#"{"sub":"1","email":"a@b.c","name":"x","role":"Admin","iss":"clementine-api","aud":"clementine-client","iat":0,"exp":99999999999}"#,
        );
        segments[1] = &forged;
        let tampered = segments.join(".");

        assert!(matches!(
            signer.validate(&tampered),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let pair = signer().issue(&user()).unwrap();

        let other = TokenSigner::new(&TokenConfig {
            secret: SecretString::from("qW3#eR5$tY7!uI9@oP1%aS2^dF4&gH6*"),
            issuer: "clementine-api".to_string(),
            audience: "clementine-client".to_string(),
            access_token_expiry_minutes: 15,
        });

        assert!(matches!(
            other.validate(&pair.access_token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired_signer = TokenSigner::new(&TokenConfig {
            secret: SecretString::from("kX9#mP2$vQ7!nR4@wT8%yU3^zA6&bC1*"),
            issuer: "clementine-api".to_string(),
            audience: "clementine-client".to_string(),
            access_token_expiry_minutes: -1,
        });

        let pair = expired_signer.issue(&user()).unwrap();
        assert!(matches!(
            expired_signer.validate(&pair.access_token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let pair = signer().issue(&user()).unwrap();

        let other = TokenSigner::new(&TokenConfig {
            secret: SecretString::from("kX9#mP2$vQ7!nR4@wT8%yU3^zA6&bC1*"),
            issuer: "someone-else".to_string(),
            audience: "clementine-client".to_string(),
            access_token_expiry_minutes: 15,
        });

        assert!(matches!(
            other.validate(&pair.access_token),
            Err(TokenError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let pair = signer().issue(&user()).unwrap();

        let other = TokenSigner::new(&TokenConfig {
            secret: SecretString::from("kX9#mP2$vQ7!nR4@wT8%yU3^zA6&bC1*"),
            issuer: "clementine-api".to_string(),
            audience: "someone-else".to_string(),
            access_token_expiry_minutes: 15,
        });

        assert!(matches!(
            other.validate(&pair.access_token),
            Err(TokenError::InvalidAudience)
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let signer = signer();
        assert!(matches!(
            signer.validate("not-a-token"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            signer.validate("a.b.c.d"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(signer.validate(""), Err(TokenError::Malformed)));
    }

    #[test]
    fn test_refresh_tokens_are_random() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_ne!(a, b);
        // 32 bytes -> 44 base64 chars
        assert_eq!(a.len(), 44);
    }
}

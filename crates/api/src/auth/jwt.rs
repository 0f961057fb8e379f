//! JWT access-token generation/validation and refresh-token helpers.
//!
//! Access tokens are HS256-signed JWTs containing a [`Claims`] payload that
//! names the kind of subject (staff user or driver), its role and its unit.
//! Refresh tokens are opaque random strings; only their SHA-256 hash is stored
//! server-side.

use fleetcheck_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Which table `sub` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Staff,
    Driver,
}

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- a `users.id` or `drivers.id`, depending on `kind`.
    pub sub: DbId,
    pub kind: SubjectKind,
    /// Staff role name, or `"driver"`.
    pub role: String,
    pub unit: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 60).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `60`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }
}

/// Generate an HS256 access token for a staff user or a driver.
pub fn generate_access_token(
    kind: SubjectKind,
    subject_id: DbId,
    role: &str,
    unit: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: subject_id,
        kind,
        role: role.to_string(),
        unit: unit.to_string(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Validates the signature and expiration automatically.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Generate a random refresh token as `(plaintext, sha256_hex_hash)`.
///
/// The plaintext is sent to the client; only the hash is persisted.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let hash = hash_refresh_token(&plaintext);
    (plaintext, hash)
}

pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "fleetcheck-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        }
    }

    #[test]
    fn staff_token_round_trip() {
        let config = test_config();
        let token = generate_access_token(SubjectKind::Staff, 42, "master", "Sul", &config)
            .expect("token generation should succeed");

        let claims = validate_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.kind, SubjectKind::Staff);
        assert_eq!(claims.role, "master");
        assert_eq!(claims.unit, "Sul");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn driver_token_keeps_kind() {
        let config = test_config();
        let token = generate_access_token(SubjectKind::Driver, 7, "driver", "Norte", &config)
            .expect("token generation should succeed");
        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.kind, SubjectKind::Driver);
    }

    #[test]
    fn expired_token_fails() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            kind: SubjectKind::Staff,
            role: "admin".to_string(),
            unit: "Sul".to_string(),
            exp: now - 300,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn other_secret_fails() {
        let token = generate_access_token(SubjectKind::Staff, 1, "admin", "Sul", &test_config())
            .unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            ..test_config()
        };
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn refresh_tokens_are_unique_and_hashed() {
        let (a, hash_a) = generate_refresh_token();
        let (b, _) = generate_refresh_token();
        assert_ne!(a, b);
        assert_eq!(hash_refresh_token(&a), hash_a);
        assert_eq!(hash_a.len(), 64);
    }
}

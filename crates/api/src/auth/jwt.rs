//! Token issuance and verification.
//!
//! Tokens are EdDSA (Ed25519) signed JWTs with a fixed issuer and audience.
//! The server keeps no session state: a token is valid until it expires,
//! and the holder is re-resolved against the database on every request.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pomucky_core::auth::{DEFAULT_TOKEN_TTL_HOURS, TOKEN_AUDIENCE, TOKEN_ISSUER};
use pomucky_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's id as a decimal string.
    pub sub: String,
    pub iss: String,
    pub aud: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

impl Claims {
    /// The subject as a user id. `None` if it is not a positive integer.
    pub fn user_id(&self) -> Option<DbId> {
        self.sub.parse::<DbId>().ok().filter(|id| *id > 0)
    }
}

/// Parsed signing and verification keys.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    public_pem: String,
}

impl TokenKeys {
    /// Parse a PEM Ed25519 key pair.
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            encoding: EncodingKey::from_ed_pem(private_pem.as_bytes())?,
            decoding: DecodingKey::from_ed_pem(public_pem.as_bytes())?,
            public_pem: public_pem.trim().to_string(),
        })
    }

    /// PEM of the verification key, published so clients can check tokens.
    pub fn public_pem(&self) -> &str {
        &self.public_pem
    }
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("public_pem", &self.public_pem)
            .finish_non_exhaustive()
    }
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub keys: TokenKeys,
    /// Token lifetime in hours (default: 12).
    pub ttl_hours: i64,
    /// Whether the `token` cookie is marked `Secure` (default: false).
    pub cookie_secure: bool,
}

impl TokenConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `TOKEN_PRIVATE_KEY_FILE` | **yes**  | --      |
    /// | `TOKEN_PUBLIC_KEY_FILE`  | **yes**  | --      |
    /// | `TOKEN_TTL_HOURS`        | no       | `12`    |
    /// | `TOKEN_COOKIE_SECURE`    | no       | `false` |
    ///
    /// # Panics
    ///
    /// Panics if a key file is missing, unreadable or not an Ed25519 PEM key.
    pub fn from_env() -> Self {
        let private_path = std::env::var("TOKEN_PRIVATE_KEY_FILE")
            .expect("TOKEN_PRIVATE_KEY_FILE must be set in the environment");
        let public_path = std::env::var("TOKEN_PUBLIC_KEY_FILE")
            .expect("TOKEN_PUBLIC_KEY_FILE must be set in the environment");

        let private_pem = std::fs::read_to_string(&private_path)
            .unwrap_or_else(|e| panic!("Cannot read private key '{private_path}': {e}"));
        let public_pem = std::fs::read_to_string(&public_path)
            .unwrap_or_else(|e| panic!("Cannot read public key '{public_path}': {e}"));

        let keys = TokenKeys::from_pem(&private_pem, &public_pem)
            .expect("token keys must be a PEM Ed25519 key pair");

        let ttl_hours: i64 = std::env::var("TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_HOURS.to_string())
            .parse()
            .expect("TOKEN_TTL_HOURS must be a valid i64");

        let cookie_secure: bool = std::env::var("TOKEN_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("TOKEN_COOKIE_SECURE must be true or false");

        Self {
            keys,
            ttl_hours,
            cookie_secure,
        }
    }
}

/// Sign a token for `user_id`, valid for `config.ttl_hours`.
pub fn issue_token(user_id: DbId, config: &TokenConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        aud: TOKEN_AUDIENCE.to_string(),
        iat: now,
        exp: now + config.ttl_hours * 3600,
        jti: Uuid::new_v4().to_string(),
    };
    encode(&Header::new(Algorithm::EdDSA), &claims, &config.keys.encoding)
}

/// Verify signature, issuer, audience and expiry, returning the claims.
pub fn verify_token(token: &str, config: &TokenConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_audience(&[TOKEN_AUDIENCE]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

    decode::<Claims>(token, &config.keys.decoding, &validation).map(|data| data.claims)
}

//! HS256 access tokens.
//!
//! Tokens carry the username as `sub` and expire after the configured TTL.
//! There is no revocation list: a token stays valid until `exp`.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::AuthSettings;
use crate::error::{AppError, AppResult};

/// Access token issuer.
pub const TOKEN_ISSUER: &str = "aiops-testhub";

/// Access token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub iss: String,
    pub iat: usize,
    pub exp: usize,
}

/// Issues and verifies access tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenService {
    secret: SecretString,
    ttl: chrono::Duration,
}

impl TokenService {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            secret: settings.secret_key.clone(),
            ttl: chrono::Duration::minutes(settings.access_token_ttl_minutes),
        }
    }

    /// Default token lifetime.
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Sign a token for `subject`, valid for `ttl` or the configured default.
    pub fn create(&self, subject: &str, ttl: Option<chrono::Duration>) -> AppResult<String> {
        let now = chrono::Utc::now();
        let exp = now + ttl.unwrap_or(self.ttl);

        let claims = AccessClaims {
            sub: subject.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp().max(0) as usize,
            exp: exp.timestamp().max(0) as usize,
        };

        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| AppError::Internal(format!("Failed to create access token: {}", e)))
    }

    /// Verify signature, issuer and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, String> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.validate_aud = false;
        validation.leeway = 0;

        let token_data = decode::<AccessClaims>(token, &key, &validation)
            .map_err(|e| format!("Invalid access token: {}", e))?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

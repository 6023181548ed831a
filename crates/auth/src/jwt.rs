//! HS256 token signing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use devcamp_core::UserId;

use crate::{JwtClaims, Role, TokenValidationError, validate_claims};

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// Signs new session tokens.
pub trait JwtIssuer: Send + Sync {
    fn issue(&self, sub: UserId, role: Role, now: DateTime<Utc>) -> Result<String, TokenIssueError>;
}

#[derive(Debug, Error)]
#[error("failed to sign token: {0}")]
pub struct TokenIssueError(#[from] jsonwebtoken::errors::Error);

/// Shared-secret HS256 implementation of both [`JwtIssuer`] and [`JwtValidator`].
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256Jwt {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl JwtIssuer for Hs256Jwt {
    fn issue(&self, sub: UserId, role: Role, now: DateTime<Utc>) -> Result<String, TokenIssueError> {
        let claims = JwtClaims::new(sub, role, now, self.ttl);
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        // Time checks run against the injected clock in `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

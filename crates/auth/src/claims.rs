use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use devcamp_core::UserId;

use crate::Role;

/// JWT claims model (transport-agnostic).
///
/// Timestamps are Unix seconds so the payload stays compatible with standard
/// JWT tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the user the token was issued to.
    pub sub: UserId,

    /// Role at issue time. The API re-reads the user on every request, so this
    /// is informational.
    pub role: Role,

    /// Issued-at (seconds since epoch).
    pub iat: i64,

    /// Expiration (seconds since epoch).
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(sub: UserId, role: Role, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub,
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

//! Single-use password reset tokens.
//!
//! The raw token is only ever emailed; storage keeps its SHA-256 digest.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

pub const RESET_TOKEN_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
pub struct ResetToken {
    pub raw: String,
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn issue(now: DateTime<Utc>) -> Self {
        let mut buf = [0u8; 20];
        OsRng.fill_bytes(&mut buf);
        let raw = URL_SAFE_NO_PAD.encode(buf);

        Self {
            digest: Self::digest(&raw),
            raw,
            expires_at: now + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        }
    }

    pub fn digest(raw: &str) -> String {
        format!("{:x}", Sha256::digest(raw.as_bytes()))
    }
}

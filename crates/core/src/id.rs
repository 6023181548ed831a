//! Record identifiers.
//!
//! Both ids are UUIDv7, so they sort by creation time and serialize as the bare
//! UUID string.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

/// Identifier of a bootcamp listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BootcampId(Uuid);

macro_rules! record_id {
    ($t:ident) => {
        impl $t {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Rehydrate a stored id.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        /// Path segments and query values arrive as text.
        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| DomainError::invalid_id(s))
            }
        }
    };
}

record_id!(UserId);
record_id!(BootcampId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_what_it_prints() {
        let id = BootcampId::new();
        assert_eq!(id.to_string().parse::<BootcampId>().unwrap(), id);
    }

    #[test]
    fn garbage_is_rejected_with_the_raw_text() {
        let err = "5d1725a".parse::<UserId>().unwrap_err();
        assert_eq!(err, DomainError::InvalidId("5d1725a".to_string()));
        assert_eq!(err.to_string(), "Resource not found with id of 5d1725a");
    }
}

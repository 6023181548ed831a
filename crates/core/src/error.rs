//! Errors raised by domain rules.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// A rule rejected the input. Carries the message shown to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    /// Text that does not parse as a record id.
    #[error("Resource not found with id of {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(raw: impl Into<String>) -> Self {
        Self::InvalidId(raw.into())
    }
}

//! One error type for every handler, rendered as `{ "success": false, "error": ... }`.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use devcamp_auth::{AuthzError, PasswordError, TokenIssueError};
use devcamp_core::DomainError;
use devcamp_infra::{GeocodeError, StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Duplicate field value entered")]
    Duplicate,

    /// Server-side failure with a message that is safe to show.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_authorized() -> Self {
        Self::Unauthorized("Not authorized to access this route".to_string())
    }

    pub fn invalid_credentials() -> Self {
        Self::Unauthorized("Invalid credentials".to_string())
    }

    /// Log `source` and answer with a generic 500.
    pub fn internal(context: &str, source: impl std::fmt::Display) -> Self {
        tracing::error!(error = %source, "{context}");
        Self::Internal("Server Error".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Duplicate => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        json_error(self.status(), self.to_string())
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": message.into(),
        })),
    )
        .into_response()
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::BadRequest(msg),
            DomainError::InvalidId(_) => ApiError::NotFound(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => ApiError::Duplicate,
            other => ApiError::internal("store failure", other),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::RoleNotAllowed(_) => ApiError::Forbidden(err.to_string()),
            AuthzError::NotOwner { .. } => ApiError::Unauthorized(err.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::internal("password hashing failed", err)
    }
}

impl From<TokenIssueError> for ApiError {
    fn from(err: TokenIssueError) -> Self {
        ApiError::internal("token signing failed", err)
    }
}

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        ApiError::internal("geocoding failed", err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(_: MultipartRejection) -> Self {
        ApiError::BadRequest("Please upload a file".to_string())
    }
}

/// Reading the upload failed. Oversized bodies trip the body limit and get the
/// same answer as an oversized file.
pub fn multipart_error(err: MultipartError, max_bytes: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::BadRequest(format!("Please upload an image less than {max_bytes}"))
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

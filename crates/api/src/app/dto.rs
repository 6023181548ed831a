use axum::extract::FromRequest;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use devcamp_auth::Role;
use devcamp_bootcamps::Pagination;

use crate::app::errors::ApiError;
use crate::middleware::TOKEN_COOKIE;

/// `Json` whose rejections render through [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDetailsRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
}

// -------------------------
// Response envelopes
// -------------------------

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: None,
        data,
    })
}

pub fn ok_with<T: Serialize>(message: &'static str, data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: Some(message),
        data,
    })
}

pub fn message_only(message: &'static str) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct CountedResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

// -------------------------
// Token cookie
// -------------------------

/// `200 { success, token }` plus the session cookie.
pub fn token_response(token: String, cookie_days: u32, secure: bool) -> Response {
    let max_age = i64::from(cookie_days) * 86_400;
    let cookie = session_cookie(&token, max_age, secure);
    with_cookie(
        (StatusCode::OK, Json(json!({ "success": true, "token": token }))).into_response(),
        &cookie,
    )
}

/// Overwrite the session cookie with `none`, expiring in ten seconds.
pub fn logout_response(secure: bool) -> Response {
    let cookie = session_cookie("none", 10, secure);
    with_cookie(
        (StatusCode::OK, Json(json!({ "success": true, "data": {} }))).into_response(),
        &cookie,
    )
}

fn session_cookie(value: &str, max_age_secs: i64, secure: bool) -> String {
    let expires = (Utc::now() + Duration::seconds(max_age_secs)).format("%a, %d %b %Y %H:%M:%S GMT");
    let mut cookie = format!(
        "{TOKEN_COOKIE}={value}; HttpOnly; Path=/; Max-Age={max_age_secs}; Expires={expires}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!(error = %e, "session cookie is not a valid header value"),
    }
    response
}

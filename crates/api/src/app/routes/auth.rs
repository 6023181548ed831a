use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path},
    http::{HeaderMap, header},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::Utc;
use tracing::{info, warn};

use devcamp_auth::user::{normalize_email, validate_password};
use devcamp_auth::{
    JwtIssuer, NewUser, ResetToken, User, UserDetailsUpdate, hash_password, verify_password,
};
use devcamp_infra::EmailMessage;

use crate::app::dto::{self, ApiJson};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;
use crate::middleware::{AuthState, auth_middleware};

pub fn router(auth: AuthState) -> Router {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/:resettoken", put(reset_password));

    let protected = Router::new()
        .route("/logout", get(logout))
        .route("/me", get(me))
        .route("/update-details", put(update_details))
        .route("/update-password", put(update_password))
        .route_layer(from_fn_with_state(auth, auth_middleware));

    public.merge(protected)
}

/// Argon2 runs on the blocking pool.
async fn hash_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal("hash task failed", e))?
        .map_err(ApiError::from)
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::internal("verify task failed", e))?
        .map_err(ApiError::from)
}

fn send_token(services: &AppServices, user: &User) -> Result<Response, ApiError> {
    let token = services.jwt.issue(user.id, user.role, Utc::now())?;
    Ok(dto::token_response(
        token,
        services.settings.cookie_days,
        services.settings.secure_cookies,
    ))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::RegisterRequest>,
) -> Result<Response, ApiError> {
    let new_user = NewUser::new(body.name, body.email, body.password, body.role)?;
    let hash = hash_blocking(new_user.password.clone()).await?;
    let user = new_user.into_user(hash, Utc::now());
    services.users.insert(&user).await?;

    info!(user_id = %user.id, "user registered");
    send_token(&services, &user)
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::LoginRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (non_empty(body.email), non_empty(body.password)) else {
        return Err(ApiError::BadRequest(
            "Please provide an email and password".to_string(),
        ));
    };

    let user = services
        .users
        .find_by_email(&email.trim().to_lowercase())
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    if !verify_blocking(password, user.password_hash.clone()).await? {
        return Err(ApiError::invalid_credentials());
    }

    send_token(&services, &user)
}

pub async fn logout(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    dto::logout_response(services.settings.secure_cookies)
}

pub async fn me(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    dto::ok(user.0)
}

pub async fn update_details(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
    ApiJson(body): ApiJson<dto::UpdateDetailsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = UserDetailsUpdate::new(body.name, body.email)?;
    user.apply_details(update);
    services.users.update(&user).await?;
    Ok(dto::ok(user))
}

pub async fn update_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
    ApiJson(body): ApiJson<dto::UpdatePasswordRequest>,
) -> Result<Response, ApiError> {
    let (Some(current), Some(new)) = (non_empty(body.current_password), non_empty(body.new_password))
    else {
        return Err(ApiError::BadRequest(
            "Please provide the current and the new password".to_string(),
        ));
    };
    validate_password(&new)?;

    if !verify_blocking(current, user.password_hash.clone()).await? {
        return Err(ApiError::Unauthorized("Password is incorrect".to_string()));
    }

    user.set_password_hash(hash_blocking(new).await?);
    services.users.update(&user).await?;
    send_token(&services, &user)
}

pub async fn forgot_password(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<dto::ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(body.email.as_deref().unwrap_or_default())?;
    let mut user = services
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("There is no user with that email".to_string()))?;

    let token = ResetToken::issue(Utc::now());
    user.set_reset_token(token.digest.clone(), token.expires_at);
    services.users.update(&user).await?;

    let url = format!(
        "{}/api/v1/auth/reset-password/{}",
        origin(&headers, services.settings.secure_cookies),
        token.raw
    );
    let message = EmailMessage {
        to: user.email.clone(),
        subject: "Password reset token".to_string(),
        text: format!(
            "You are receiving this email because you (or someone else) has requested \
             the reset of a password. Please make a PUT request to: \n\n {url}"
        ),
    };

    if let Err(e) = services.mailer.send(message).await {
        warn!(user_id = %user.id, error = %e, "reset email failed; clearing token");
        user.clear_reset_token();
        services.users.update(&user).await?;
        return Err(ApiError::Internal("Email could not be sent".to_string()));
    }

    info!(user_id = %user.id, "password reset email sent");
    Ok(dto::ok("Email sent"))
}

pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    Path(raw_token): Path<String>,
    ApiJson(body): ApiJson<dto::ResetPasswordRequest>,
) -> Result<Response, ApiError> {
    let digest = ResetToken::digest(&raw_token);
    let mut user = services
        .users
        .find_by_reset_token(&digest, Utc::now())
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid token".to_string()))?;

    let password = body.password.unwrap_or_default();
    validate_password(&password)?;

    user.set_password_hash(hash_blocking(password).await?);
    user.clear_reset_token();
    services.users.update(&user).await?;

    info!(user_id = %user.id, "password reset");
    send_token(&services, &user)
}

/// `scheme://host` the client used to reach us.
fn origin(headers: &HeaderMap, default_https: bool) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or(if default_https { "https" } else { "http" });
    format!("{scheme}://{host}")
}

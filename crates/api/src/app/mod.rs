//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repositories and external clients shared by handlers
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request bodies, response envelopes, session cookie
//! - `errors.rs`: the error → response mapping

use std::sync::Arc;

use axum::{Extension, Router, extract::DefaultBodyLimit};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::AuthState;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, Settings};

/// Room for multipart framing and the other form fields on top of the file.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = AuthState {
        jwt: services.jwt.clone(),
        users: services.users.clone(),
    };

    let body_limit = usize::try_from(services.settings.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_SLACK);

    Router::new()
        .merge(routes::system_router())
        .nest("/api/v1", routes::router(auth_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
}

use axum::{Router, routing::get};

use crate::middleware::AuthState;

pub mod auth;
pub mod bootcamps;
pub mod system;

/// Versioned resource routes, mounted under `/api/v1`.
pub fn router(auth_state: AuthState) -> Router {
    Router::new()
        .nest("/bootcamps", bootcamps::router(auth_state.clone()))
        .nest("/auth", auth::router(auth_state))
}

/// Unversioned operational routes.
pub fn system_router() -> Router {
    Router::new().route("/health", get(system::health))
}

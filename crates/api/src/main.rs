use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use devcamp_api::app::{AppServices, build_app};
use devcamp_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("pretty") => devcamp_observability::init_pretty(),
        _ => devcamp_observability::init(),
    }

    let config = AppConfig::from_env().context("loading configuration")?;
    let services = AppServices::from_config(&config).await?;
    let app = build_app(Arc::new(services));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        env = ?config.env,
        "devcamp api listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

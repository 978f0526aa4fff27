use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api;
use crate::config::ServerConfig;
use crate::dashboard::DashboardController;

pub fn app(dashboard: Arc<DashboardController>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(dashboard))
        .layer(cors)
}

pub async fn run(server: &ServerConfig, dashboard: Arc<DashboardController>) -> Result<()> {
    let addr = format!("{}:{}", server.bind_address, server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", server.port);
    axum::serve(listener, app(dashboard))
        .await
        .context("Web server stopped unexpectedly")
}

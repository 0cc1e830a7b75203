//! Server bootstrap: middleware stack, bind, graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use aqiwatch_core::Config;

use crate::api;
use crate::state::ProxyState;

/// Router with tracing and permissive CORS applied.
pub fn app(state: Arc<ProxyState>) -> Router {
    api::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Run the proxy until Ctrl-C.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = ProxyState::from_config(config)?;
    let addr: SocketAddr = config.server.bind.parse()?;

    info!(
        "Starting AQI proxy on {} (backend: {})",
        addr, state.backend_url
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("AQI proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

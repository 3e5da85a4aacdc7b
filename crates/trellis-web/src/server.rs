use crate::routes::{health_routes, screen_routes};
use crate::state::AppState;
use crate::{Result, WebError};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use trellis_config::ServerConfig;

/// Router with every endpoint and the configured layers.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let app = Router::new()
        .merge(screen_routes())
        .merge(health_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_request_bytes()))
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);
        app.layer(cors)
    } else {
        app
    }
}

pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = build_router(state, config);

    let addr: SocketAddr = config.socket_addr().ok_or_else(|| {
        WebError::Config(format!(
            "Invalid address: {}:{}",
            config.bind_address, config.port
        ))
    })?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(WebError::Io)?;

    tracing::info!("Starting screen server on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(WebError::Io)?;

    tracing::info!("Screen server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

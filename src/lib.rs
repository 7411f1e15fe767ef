pub mod config;
pub mod db;
pub mod discovery;
pub mod errors;
pub mod forms;
mod http;
pub mod identity;
pub mod likes;
pub mod mail;
mod middleware;
pub mod models;
pub mod state;
mod ws;

use axum::{Router, http::StatusCode, middleware as axum_middleware};
use config::Config;
use middleware::{cors_layer, create_global_rate_limiter, rate_limit_middleware};
use state::AppState;
use std::net::SocketAddr;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState, config: &Config) -> Router {
    let global_rate_limiter = create_global_rate_limiter();

    Router::new()
        .merge(http::create_http_routes(state.clone()))
        .merge(ws::create_ws_routes(state))
        .layer(axum_middleware::from_fn(move |req, next| {
            rate_limit_middleware(global_rate_limiter.clone(), req, next)
        }))
        .layer(cors_layer(&config.allowed_origins))
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(TraceLayer::new_for_http())
        .fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") })
}

pub async fn start_server() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return;
        }
    };

    let state = match AppState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize record store: {}", e);
            return;
        }
    };

    let app = create_app(state, &config);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", address, e);
            return;
        }
    };

    tracing::info!("Chewzy backend running on {}", address);

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        tracing::error!("Server error: {}", e);
    }

    tracing::info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

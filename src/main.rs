use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod error;
mod models;
mod services;
mod utils;
mod wallet;

use config::Config;
use constants::API_VERSION;
use wallet::{RpcWalletProvider, WalletAdapter, WalletProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snr_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting SNR Backend Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);

    // Wallet provider (optional)
    let rpc = match config.ethereum_rpc_url.as_deref() {
        Some(url) => {
            let provider = RpcWalletProvider::new(
                url,
                Duration::from_secs(config.wallet_poll_interval_secs),
            )?;
            tracing::info!("Wallet provider connected to RPC endpoint");
            Some(Arc::new(provider))
        }
        None => None,
    };
    let provider = rpc
        .clone()
        .map(|rpc| rpc as Arc<dyn WalletProvider>);
    let adapter = Arc::new(WalletAdapter::new(provider, config.token_address()?));

    let app_state = api::AppState {
        config: config.clone(),
        contact_log: Arc::new(services::TracingContactLog),
        wallet: adapter.clone(),
    };

    // Build router
    let app = build_router(app_state);

    // Start background services
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let background =
        services::start_background_services(&config, adapter, rpc, shutdown_rx);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    for task in background {
        if let Err(e) = task.await {
            tracing::warn!("Background task ended abnormally: {}", e);
        }
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal(shutdown: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    let _ = shutdown.send(true);
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Contact form
        .route("/api/contact", post(api::contact::submit_contact))
        // Wallet
        .route(
            "/api/v1/wallet/balances",
            post(api::wallet::get_balances),
        )
        .route("/api/v1/wallet/session", get(api::wallet::get_session))
        // Game rooms (fixtures)
        .route("/api/v1/rooms", get(api::rooms::list_rooms))
        .route(
            "/api/v1/rooms/{room_id}/eligibility",
            post(api::rooms::check_eligibility),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        if config.is_production() {
            tracing::warn!("Permissive CORS in production; set CORS_ALLOWED_ORIGINS");
        }
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

//! otp-wallet Service - HTTP API for wallet-funded OTP purchases
//!
//! This is the main entry point for the otp-wallet service.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use otp_wallet_service::auth::spawn_session_sweeper;
use otp_wallet_service::{create_router, AppState, ServiceConfig};
use otp_wallet_store::RocksStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,otp_wallet=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting otp-wallet service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        session_ttl_hours = config.session_ttl_hours,
        session_sweep_interval_seconds = config.session_sweep_interval_seconds,
        admin_usernames = ?config.admin_usernames,
        identity_configured = %config.identity.is_some(),
        "Service configuration loaded"
    );

    // Initialize RocksDB store
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    let store = Arc::new(RocksStore::open(&config.data_dir)?);

    // Expired sessions are only removed on access otherwise
    spawn_session_sweeper(
        Arc::clone(&store),
        Duration::from_secs(config.session_sweep_interval_seconds),
    );

    // Build app state
    let state = AppState::new(store, config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

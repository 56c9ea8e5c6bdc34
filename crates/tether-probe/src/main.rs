//! Tether Probe - HTTP sidecar for an upstream service
//!
//! This is the main entry point for the probe. It wraps the upstream in a
//! lifecycle-managed facade and serves `/health`, `/status` and `/commands`.
//!
//! # Configuration
//!
//! - `LISTEN_ADDR` (default `0.0.0.0:8080`)
//! - `UPSTREAM_URL` (default `http://127.0.0.1:9000`)
//! - `UPSTREAM_HEALTH_PATH` (default `/health`)
//! - `DRAIN_DELAY_MS` (default `5000`)
//! - `REQUEST_TIMEOUT_SECONDS` (default `10`)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tether_probe::{build_facade, create_router, shutdown_signal, ProbeConfig, ProbeState, Upstream};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tether=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tether Probe");

    // Load configuration from environment
    let config = ProbeConfig::from_env()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        upstream_url = %config.upstream_url,
        health_url = %config.health_url(),
        drain_delay_ms = config.drain_delay_ms,
        request_timeout_seconds = config.request_timeout_seconds,
        "Probe configuration loaded"
    );

    let upstream = Upstream::new(&config)?;
    let facade = build_facade(upstream, &config)?;
    tracing::info!(facade_id = %facade.id(), kind = %facade.kind(), "Facade initialized");

    let app = create_router(ProbeState::new(facade.clone(), config.clone()));

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(facade, config.drain_delay()))
        .await?;

    tracing::info!("Probe stopped");
    Ok(())
}

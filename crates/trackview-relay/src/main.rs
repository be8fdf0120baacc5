//! Relay entry point.
//!
//! Initializes logging, loads configuration, validates the frame schema,
//! binds the UDP ingest socket, and runs the HTTP/`WebSocket` server until
//! Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trackview_relay::config::RelayConfig;
use trackview_relay::server::ServerConfig;
use trackview_relay::state::AppState;
use trackview_relay::{ingest, server};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the schema fails validation, a socket cannot bind,
/// or the server encounters a fatal fault.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("trackview-relay starting");

    let config_path =
        PathBuf::from(std::env::var("TRACKVIEW_CONFIG").unwrap_or_else(|_| "trackview.yaml".to_owned()));
    let config = if config_path.exists() {
        RelayConfig::from_file(&config_path)?
    } else {
        warn!(path = %config_path.display(), "config file not found, using defaults");
        let mut config = RelayConfig::default();
        config.apply_env_overrides()?;
        config
    };
    info!(
        http_port = config.http.port,
        udp_port = config.udp.port,
        asset_root = %config.assets.root.display(),
        "configuration loaded"
    );

    // An invalid schema aborts startup.
    let schema = config.load_schema()?;
    info!(
        fields = schema.fields.len(),
        datagram_len = schema.datagram_len(),
        "frame schema validated"
    );

    let state = AppState::new(schema, config.assets.root.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown requested");
        let _ = shutdown_tx.send(true);
    });

    // Bind the ingest socket before serving so port conflicts fail fast.
    let udp_addr = format!("{}:{}", config.http.host, config.udp.port);
    let udp_socket = UdpSocket::bind(&udp_addr).await?;
    info!(addr = udp_addr, "listening for UDP telemetry");
    tokio::spawn(ingest::run_ingest(
        udp_socket,
        Arc::clone(&state.relay),
        shutdown_rx.clone(),
    ));

    let server_config = ServerConfig {
        host: config.http.host.clone(),
        port: config.http.port,
    };
    server::start_server(&server_config, state, shutdown_rx).await?;

    info!("trackview-relay stopped");
    Ok(())
}

//! Headless viewer entry point.
//!
//! Connects to a relay's `/data` endpoint and drives a logging surface at
//! one frame per second, so the full decode/entity/transform pipeline can
//! run and be observed without a graphical backend.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trackview_types::FrameSchema;
use trackview_viewer::ViewerState;
use trackview_viewer::connector::WsConnector;
use trackview_viewer::entity::{EntityTable, MapGeometry};
use trackview_viewer::render::{LogSurface, run_render_loop};
use trackview_viewer::session::ViewerSession;
use trackview_viewer::transform::ViewTransform;

/// Default relay endpoint.
const DEFAULT_DATA_URL: &str = "ws://127.0.0.1:50000/data";

/// Native pixel size of the deployed map image.
const MAP_IMAGE_SIZE: (f64, f64) = (2048.0, 2048.0);

/// Stand-in viewport for the headless surface.
const VIEWPORT_SIZE: (f64, f64) = (1280.0, 720.0);

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the map geometry is invalid or a background task
/// panics.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let url = std::env::var("TRACKVIEW_DATA_URL").unwrap_or_else(|_| DEFAULT_DATA_URL.to_owned());
    info!(%url, "trackview-viewer starting");

    let mut transform = ViewTransform::new(MAP_IMAGE_SIZE.0, MAP_IMAGE_SIZE.1)?;
    transform.resize(VIEWPORT_SIZE.0, VIEWPORT_SIZE.1);
    let shared = ViewerState::shared(EntityTable::new(MapGeometry::default()), transform);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let session = ViewerSession::new(
        WsConnector::new(url),
        Arc::new(FrameSchema::deployed()),
        Arc::clone(&shared),
    );
    let session_task = tokio::spawn(session.run(shutdown_rx.clone()));

    let render_task = tokio::spawn(run_render_loop(
        Arc::clone(&shared),
        LogSurface::new(),
        Duration::from_secs(1),
        shutdown_rx,
    ));

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    let _ = shutdown_tx.send(true);

    session_task.await?;
    render_task.await?;

    info!("trackview-viewer stopped");
    Ok(())
}

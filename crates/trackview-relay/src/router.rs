//! Axum router construction for the relay server.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{assets, handlers, ws};

/// Build the complete Axum router for the relay.
///
/// Routes:
/// - `GET /data` -- `WebSocket` datagram push stream
/// - `GET /status` -- subscriber count and traffic counters
/// - everything else -- static assets from the configured root
///
/// CORS is open so a viewer page served from elsewhere can still reach
/// the data stream during development.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/data", get(ws::ws_data))
        .route("/status", get(handlers::status))
        .fallback(get(assets::serve_asset))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

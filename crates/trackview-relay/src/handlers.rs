//! REST endpoint handlers for the relay server.

use axum::Json;
use axum::extract::State;

use crate::relay::RelayStats;
use crate::state::AppState;

/// JSON body for the `GET /status` endpoint.
#[derive(Debug, serde::Serialize)]
pub struct StatusBody {
    /// Currently connected viewers.
    pub subscribers: usize,
    /// Declared datagram length in bytes.
    pub datagram_len: usize,
    /// Traffic counters since startup.
    #[serde(flatten)]
    pub stats: RelayStats,
}

/// Report subscriber count and traffic counters.
///
/// # Route
///
/// `GET /status`
pub async fn status(State(state): State<AppState>) -> Json<StatusBody> {
    Json(StatusBody {
        subscribers: state.relay.subscriber_count(),
        datagram_len: state.relay.datagram_len(),
        stats: state.relay.stats(),
    })
}

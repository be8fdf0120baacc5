//! `WebSocket` handler for the `/data` push stream.
//!
//! A viewer connects with `GET /data`; the request upgrades to a
//! `WebSocket` and the handler forwards every relayed datagram as one
//! binary message. Each connection holds its own broadcast receiver, so
//! subscribers are isolated: send failure or close ends only this task,
//! and a lagged receiver skips to the newest datagram.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::debug;

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` and begin streaming datagrams.
///
/// # Route
///
/// `GET /data`
pub async fn ws_data(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: subscribe to the relay and forward
/// each datagram as a binary frame until either side closes.
async fn handle_ws(mut socket: WebSocket, state: AppState) {
    debug!("viewer connected");

    let mut rx = state.relay.subscribe();

    loop {
        tokio::select! {
            // Receive a validated datagram from the relay.
            result = rx.recv() => {
                match result {
                    Ok(datagram) => {
                        if socket.send(Message::Binary(datagram)).await.is_err() {
                            debug!("viewer disconnected (send failed)");
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "viewer lagged, skipping ahead");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("relay closed, shutting down viewer stream");
                        return;
                    }
                }
            }
            // Check if the viewer sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("viewer disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("viewer disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "viewer socket error");
                        return;
                    }
                    _ => {
                        // The push stream is one-way; inbound text or binary
                        // from the viewer is ignored.
                    }
                }
            }
        }
    }
}

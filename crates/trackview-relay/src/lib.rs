//! Telemetry relay server for Trackview.
//!
//! The relay accepts fixed-size telemetry datagrams over UDP and fans each
//! one out, byte for byte, to every connected viewer. Viewers register by
//! upgrading `GET /data` to a `WebSocket`; all other paths serve static
//! assets from a configured root.
//!
//! # Architecture
//!
//! ```text
//! upstream source --UDP--> ingest --> Relay (validate length, broadcast)
//!                                       |
//!                          one broadcast receiver per WebSocket client
//! ```
//!
//! Fan-out rides a [`tokio::sync::broadcast`] channel, so subscriber
//! add/remove is concurrent with in-flight broadcasts and a slow or failed
//! subscriber never delays the others: it lags (and skips ahead) or its
//! task ends, dropping its receiver.

pub mod assets;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod relay;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use config::RelayConfig;
pub use error::RelayError;
pub use relay::{Relay, RelayStats};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;

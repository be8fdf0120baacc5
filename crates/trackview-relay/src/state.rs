//! Shared application state for the relay server.

use std::path::PathBuf;
use std::sync::Arc;

use trackview_types::FrameSchema;

use crate::relay::Relay;

/// State injected into every Axum handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The fan-out core.
    pub relay: Arc<Relay>,
    /// The validated frame schema (loaded once at startup).
    pub schema: Arc<FrameSchema>,
    /// Root directory for static viewer assets.
    pub asset_root: PathBuf,
}

impl AppState {
    /// Build application state from a validated schema and asset root.
    ///
    /// The relay's declared datagram length is taken from the schema, so
    /// the length gate and the decoder can never disagree.
    pub fn new(schema: FrameSchema, asset_root: PathBuf) -> Self {
        let relay = Arc::new(Relay::new(schema.datagram_len()));
        Self {
            relay,
            schema: Arc::new(schema),
            asset_root,
        }
    }
}

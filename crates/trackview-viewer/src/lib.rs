//! Viewer pipeline for Trackview telemetry.
//!
//! Turns the relay's raw datagram stream into correctly projected vehicle
//! markers over a pannable, zoomable map:
//!
//! ```text
//! WebSocket --> decode --> EntityTable --+
//!                                        +--> render loop --> Surface
//!                  ViewTransform --------+
//! ```
//!
//! # Modules
//!
//! - [`entity`] -- Per-vehicle state keyed by id, with the sticky
//!   race-validity flag and map-relative normalization
//! - [`transform`] -- The pan/zoom/drag/resize state machine
//! - [`render`] -- The [`Surface`](render::Surface) seam and the perpetual
//!   render loop
//! - [`session`] -- The reconnecting viewer session state machine
//! - [`connector`] -- The production `WebSocket` connector
//! - [`error`] -- Session error types

pub mod connector;
pub mod entity;
pub mod error;
pub mod render;
pub mod session;
pub mod transform;

// Re-export primary types for convenience.
pub use connector::WsConnector;
pub use entity::{Entity, EntityTable, Hsl, MapGeometry};
pub use error::SessionError;
pub use render::{Marker, Surface, render_frame};
pub use session::{Connector, SessionState, ViewerSession};
pub use transform::{SCALE_MAX, ViewTransform};

/// Shared state between the network-decode path and the render path.
///
/// The session writes the entity table; the render loop reads both the
/// table and the transform. One lock covers both so a render pass sees a
/// consistent pair.
#[derive(Debug)]
pub struct ViewerState {
    /// Per-vehicle state keyed by id.
    pub entities: EntityTable,
    /// The current map view transform.
    pub transform: ViewTransform,
}

/// Shared, lock-protected viewer state.
pub type SharedViewerState = std::sync::Arc<tokio::sync::RwLock<ViewerState>>;

impl ViewerState {
    /// Build viewer state and wrap it for sharing.
    pub fn shared(entities: EntityTable, transform: ViewTransform) -> SharedViewerState {
        std::sync::Arc::new(tokio::sync::RwLock::new(Self {
            entities,
            transform,
        }))
    }
}

//! Error types for the relay server.
//!
//! [`RelayError`] unifies the HTTP-visible failure modes into a single enum
//! with an [`IntoResponse`] implementation: missing assets map to 404,
//! unexpected filesystem faults map to 500. Datagram validation failures
//! never reach HTTP; they are logged and dropped at the ingest boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the relay layer.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// An inbound datagram's length differs from the declared frame size.
    #[error("bad datagram length: expected {expected} bytes, got {actual}")]
    BadDatagramLength {
        /// The schema's declared datagram length.
        expected: usize,
        /// The received datagram length.
        actual: usize,
    },

    /// The requested asset does not exist (or is a directory).
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// Reading an asset failed for a reason other than absence.
    #[error("asset read error for {path}: {source}")]
    AssetIo {
        /// The requested asset path.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::AssetNotFound(path) => (StatusCode::NOT_FOUND, format!("not found: {path}")),
            Self::AssetIo { path, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("asset error: {path}"))
            }
            Self::BadDatagramLength { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

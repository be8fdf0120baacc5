//! Static asset serving for the viewer page.
//!
//! Every path other than the registered routes resolves against the
//! configured asset root; `/` maps to `index.html`. Absence (including
//! a path that names a directory) is a 404, every other filesystem fault
//! is a 500 and gets logged. Traversal components are rejected before any
//! filesystem access.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use axum::extract::State;
use axum::http::{Uri, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::error::RelayError;
use crate::state::AppState;

/// Serve a static asset for any unrouted path.
///
/// # Errors
///
/// Returns [`RelayError::AssetNotFound`] (404) for missing files,
/// directories, and traversal attempts; [`RelayError::AssetIo`] (500)
/// for any other filesystem fault.
pub async fn serve_asset(State(state): State<AppState>, uri: Uri) -> Result<Response, RelayError> {
    let requested = uri.path();
    let relative = resolve(requested).ok_or_else(|| {
        debug!(path = requested, "rejected asset path");
        RelayError::AssetNotFound(requested.to_owned())
    })?;
    let full = state.asset_root.join(&relative);

    match tokio::fs::read(&full).await {
        Ok(contents) => {
            let content_type = content_type_for(&relative);
            Ok(([(header::CONTENT_TYPE, content_type)], contents).into_response())
        }
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
            debug!(path = requested, "asset not found");
            Err(RelayError::AssetNotFound(requested.to_owned()))
        }
        Err(e) => {
            error!(path = requested, error = %e, "asset read failed");
            Err(RelayError::AssetIo {
                path: requested.to_owned(),
                source: e,
            })
        }
    }
}

/// Turn a request path into a safe path relative to the asset root.
///
/// Returns `None` when the path escapes the root (parent or absolute
/// components). The empty path maps to `index.html`.
fn resolve(request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Some(PathBuf::from("index.html"));
    }

    let candidate = Path::new(trimmed);
    let mut clean = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            // CurDir is harmless but everything else escapes the root.
            Component::CurDir => {}
            _ => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        return None;
    }
    Some(clean)
}

/// Map a file extension to a content type.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js" | "mjs") => "application/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}

//! Session error types.

/// Errors surfaced by the viewer session and its connectors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Establishing a connection failed. The session logs this and retries
    /// after its reconnect delay.
    #[error("failed to connect to {url}")]
    Connect {
        /// The endpoint that refused us.
        url: String,
        /// The underlying handshake failure.
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    /// An established stream failed mid-session.
    #[error("transport failed")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}

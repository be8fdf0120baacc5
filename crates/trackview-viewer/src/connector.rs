//! The production `WebSocket` connector.

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::error::SessionError;
use crate::session::Connector;

/// Connects to the relay's `/data` endpoint and yields the binary payloads
/// it pushes.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    /// Connector for the given `ws://` or `wss://` URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The endpoint this connector dials.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Connector for WsConnector {
    type Stream = BoxStream<'static, Result<Bytes, SessionError>>;

    async fn connect(&mut self) -> Result<Self::Stream, SessionError> {
        let (socket, response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|source| SessionError::Connect {
                    url: self.url.clone(),
                    source,
                })?;
        debug!(status = %response.status(), "websocket established");

        // Ping/pong is handled inside tungstenite; text frames are not
        // part of the protocol and are ignored.
        let stream = socket.filter_map(|message| async move {
            match message {
                Ok(Message::Binary(payload)) => Some(Ok(payload)),
                Ok(_) => None,
                Err(error) => Some(Err(SessionError::Transport(error))),
            }
        });
        Ok(stream.boxed())
    }
}

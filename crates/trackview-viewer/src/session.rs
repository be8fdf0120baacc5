//! The reconnecting viewer session.
//!
//! A session owns a [`Connector`] and runs forever: connect, drain the
//! datagram stream into the shared entity table, and on any failure or
//! clean close wait out a short fixed delay and connect again. There is no
//! attempt cap and no backoff growth; the relay is expected to come and go
//! and the viewer simply follows it. Entity state survives reconnects, so
//! markers stay on the map while the link is down.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use trackview_types::{FrameSchema, TelemetryFrame};

use crate::SharedViewerState;
use crate::error::SessionError;

/// Fixed pause between reconnect attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(100);

/// Connection lifecycle phases, observable through [`ViewerSession::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection; either before the first attempt or between retries.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// Datagrams are flowing.
    Connected,
}

/// Source of datagram streams for a session.
///
/// The production implementation is
/// [`WsConnector`](crate::connector::WsConnector); tests substitute
/// scripted ones.
pub trait Connector {
    /// The datagram stream one established connection yields. Stream end
    /// means the peer closed cleanly; an `Err` item means the transport
    /// failed. The session treats both as a disconnect.
    type Stream: Stream<Item = Result<Bytes, SessionError>> + Unpin + Send;

    /// Establish one connection.
    fn connect(&mut self) -> impl Future<Output = Result<Self::Stream, SessionError>> + Send;
}

/// Owns the connect/decode/apply loop for one viewer.
#[derive(Debug)]
pub struct ViewerSession<C> {
    connector: C,
    schema: Arc<FrameSchema>,
    shared: SharedViewerState,
    reconnect_delay: Duration,
    state_tx: watch::Sender<SessionState>,
}

impl<C: Connector> ViewerSession<C> {
    /// Build a session over the given connector and shared viewer state.
    pub fn new(connector: C, schema: Arc<FrameSchema>, shared: SharedViewerState) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Disconnected);
        Self {
            connector,
            schema,
            shared,
            reconnect_delay: RECONNECT_DELAY,
            state_tx,
        }
    }

    /// Override the pause between reconnect attempts.
    #[must_use]
    pub const fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Watch the session's connection state.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Run until the shutdown flag flips to `true`.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            self.state_tx.send_replace(SessionState::Connecting);
            let outcome = tokio::select! {
                outcome = self.connector.connect() => outcome,
                _ = shutdown.changed() => continue,
            };

            match outcome {
                Ok(stream) => {
                    info!("connected");
                    self.state_tx.send_replace(SessionState::Connected);
                    self.drain(stream, &mut shutdown).await;
                    self.state_tx.send_replace(SessionState::Disconnected);
                    debug!("disconnected");
                }
                Err(error) => {
                    self.state_tx.send_replace(SessionState::Disconnected);
                    warn!(%error, "connect failed");
                }
            }

            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                () = tokio::time::sleep(self.reconnect_delay) => {}
                _ = shutdown.changed() => {}
            }
        }

        self.state_tx.send_replace(SessionState::Disconnected);
    }

    /// Consume one connection until it ends, errors, or shutdown fires.
    async fn drain(&self, mut stream: C::Stream, shutdown: &mut watch::Receiver<bool>) {
        loop {
            let item = tokio::select! {
                item = stream.next() => item,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return;
                    }
                    continue;
                }
            };

            match item {
                Some(Ok(datagram)) => self.apply(&datagram).await,
                Some(Err(error)) => {
                    warn!(%error, "stream failed");
                    return;
                }
                None => return,
            }
        }
    }

    /// Decode one datagram and fold it into the entity table.
    ///
    /// Undecodable datagrams are logged and skipped; they never tear the
    /// connection down.
    async fn apply(&self, datagram: &[u8]) {
        match TelemetryFrame::from_datagram(&self.schema, datagram) {
            Ok(frame) => {
                let mut guard = self.shared.write().await;
                guard.entities.upsert(&frame);
            }
            Err(error) => {
                warn!(%error, len = datagram.len(), "dropping undecodable datagram");
            }
        }
    }
}

//! UDP ingest: the single event-driven listener for telemetry datagrams.
//!
//! Reads one datagram at a time and hands exactly the received bytes to the
//! [`Relay`]. Mis-sized datagrams are logged and dropped without affecting
//! other traffic; socket errors are logged and the loop continues. The task
//! runs until the shutdown signal flips.

use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::relay::Relay;

/// Receive buffer size. Larger than any declared frame so an oversized
/// datagram arrives with its true length and fails the length gate instead
/// of being silently truncated to the frame size.
const RECV_BUF_LEN: usize = 2048;

/// Run the UDP ingest loop until shutdown.
///
/// The socket is bound by the caller so bind failures surface during
/// startup rather than inside a background task.
pub async fn run_ingest(socket: UdpSocket, relay: Arc<Relay>, mut shutdown: watch::Receiver<bool>) {
    let mut buf = vec![0u8; RECV_BUF_LEN];
    info!(datagram_len = relay.datagram_len(), "UDP ingest running");

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!("UDP ingest shutting down");
                return;
            }
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((len, peer)) => {
                        let Some(received) = buf.get(..len) else {
                            continue;
                        };
                        if let Err(e) = relay.accept(Bytes::copy_from_slice(received)) {
                            warn!(%peer, error = %e, "datagram dropped");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "UDP receive error");
                    }
                }
            }
        }
    }
}

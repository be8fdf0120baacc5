//! The fan-out core: validate a datagram, broadcast it to all subscribers.
//!
//! [`Relay`] owns the broadcast channel. Each `WebSocket` task holds one
//! [`broadcast::Receiver`]; subscription is [`Relay::subscribe`] and removal
//! is simply dropping the receiver, so the active set mutates freely while a
//! broadcast is in flight. Delivery is best effort and independent per
//! subscriber: a receiver that falls behind sees a `Lagged` error and skips
//! ahead without affecting anyone else.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio::sync::broadcast;
use tracing::trace;

use crate::error::RelayError;

/// Capacity of the datagram broadcast channel.
///
/// A subscriber that falls more than this many datagrams behind receives
/// [`broadcast::error::RecvError::Lagged`] and resumes from the newest
/// datagram. Telemetry frames supersede each other, so skipping is safe.
const BROADCAST_CAPACITY: usize = 256;

/// Counters describing relay traffic since startup.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct RelayStats {
    /// Datagrams validated and broadcast.
    pub relayed: u64,
    /// Datagrams rejected for a length mismatch.
    pub dropped: u64,
}

/// Owning fan-out object for validated telemetry datagrams.
#[derive(Debug)]
pub struct Relay {
    /// Broadcast sender; one receiver per connected viewer.
    tx: broadcast::Sender<Bytes>,
    /// Declared datagram length; anything else is rejected unread.
    datagram_len: usize,
    /// Datagrams broadcast since startup.
    relayed: AtomicU64,
    /// Datagrams dropped for bad length since startup.
    dropped: AtomicU64,
}

impl Relay {
    /// Create a relay for datagrams of exactly `datagram_len` bytes.
    pub fn new(datagram_len: usize) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            datagram_len,
            relayed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// The declared datagram length in bytes.
    pub const fn datagram_len(&self) -> usize {
        self.datagram_len
    }

    /// Subscribe to the datagram stream.
    ///
    /// Dropping the returned receiver unsubscribes; no explicit removal
    /// call exists or is needed.
    pub fn subscribe(&self) -> broadcast::Receiver<Bytes> {
        self.tx.subscribe()
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Validate and broadcast one inbound datagram.
    ///
    /// Returns the number of subscribers the datagram was queued for
    /// (0 when nobody is connected, which is not an error).
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::BadDatagramLength`] for a mis-sized datagram;
    /// the datagram is counted as dropped and never forwarded.
    pub fn accept(&self, datagram: Bytes) -> Result<usize, RelayError> {
        if datagram.len() != self.datagram_len {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(RelayError::BadDatagramLength {
                expected: self.datagram_len,
                actual: datagram.len(),
            });
        }

        // send fails only when there are zero receivers, which is normal
        // between viewer connections.
        let delivered = self.tx.send(datagram).unwrap_or(0);
        self.relayed.fetch_add(1, Ordering::Relaxed);
        trace!(delivered, "datagram broadcast");
        Ok(delivered)
    }

    /// Snapshot of the traffic counters.
    pub fn stats(&self) -> RelayStats {
        RelayStats {
            relayed: self.relayed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accept_rejects_wrong_length_without_forwarding() {
        let relay = Relay::new(4);
        let mut rx = relay.subscribe();

        let err = relay.accept(Bytes::from_static(b"abc"));
        assert!(matches!(
            err,
            Err(RelayError::BadDatagramLength {
                expected: 4,
                actual: 3
            })
        ));
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        let stats = relay.stats();
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.relayed, 0);
    }

    #[test]
    fn accept_with_no_subscribers_is_not_an_error() {
        let relay = Relay::new(2);
        let delivered = relay.accept(Bytes::from_static(b"ok")).unwrap();
        assert_eq!(delivered, 0);
        assert_eq!(relay.stats().relayed, 1);
    }

    #[test]
    fn subscriber_count_tracks_receiver_lifetime() {
        let relay = Relay::new(2);
        assert_eq!(relay.subscriber_count(), 0);
        let rx1 = relay.subscribe();
        let rx2 = relay.subscribe();
        assert_eq!(relay.subscriber_count(), 2);
        drop(rx1);
        assert_eq!(relay.subscriber_count(), 1);
        drop(rx2);
        assert_eq!(relay.subscriber_count(), 0);
    }
}

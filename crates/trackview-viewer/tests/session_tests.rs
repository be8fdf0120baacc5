//! Integration tests for the viewer session: reconnection pacing, decode
//! tolerance, and entity state survival across connections.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::watch;
use trackview_types::{DATAGRAM_LEN, FrameSchema};
use trackview_viewer::entity::{EntityTable, MapGeometry};
use trackview_viewer::error::SessionError;
use trackview_viewer::session::{Connector, SessionState, ViewerSession};
use trackview_viewer::transform::ViewTransform;
use trackview_viewer::{SharedViewerState, ViewerState};

/// Hands out pre-scripted streams in order, then fails every further
/// connection attempt.
struct ScriptedConnector {
    scripts: VecDeque<Vec<Result<Bytes, SessionError>>>,
    attempts: Arc<AtomicU64>,
}

impl ScriptedConnector {
    fn new(scripts: Vec<Vec<Result<Bytes, SessionError>>>) -> (Self, Arc<AtomicU64>) {
        let attempts = Arc::new(AtomicU64::new(0));
        (
            Self {
                scripts: scripts.into(),
                attempts: Arc::clone(&attempts),
            },
            attempts,
        )
    }
}

impl Connector for ScriptedConnector {
    type Stream = futures::stream::Iter<std::vec::IntoIter<Result<Bytes, SessionError>>>;

    async fn connect(&mut self) -> Result<Self::Stream, SessionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.scripts.pop_front() {
            Some(items) => Ok(futures::stream::iter(items)),
            None => Err(SessionError::Transport(
                tokio_tungstenite::tungstenite::Error::ConnectionClosed,
            )),
        }
    }
}

/// Encode a deployed-layout datagram.
fn datagram(id: u32, race_on: i32, x: f32, z: f32, hue: u8) -> Bytes {
    let mut bytes = Vec::with_capacity(DATAGRAM_LEN);
    bytes.extend_from_slice(&id.to_le_bytes());
    bytes.extend_from_slice(&race_on.to_le_bytes());
    bytes.extend_from_slice(&x.to_le_bytes());
    bytes.extend_from_slice(&0f32.to_le_bytes());
    bytes.extend_from_slice(&z.to_le_bytes());
    bytes.extend_from_slice(&1.5f32.to_le_bytes());
    bytes.extend_from_slice(&42.0f32.to_le_bytes());
    bytes.push(hue);
    bytes.resize(DATAGRAM_LEN, 0);
    Bytes::from(bytes)
}

fn shared_state() -> SharedViewerState {
    let mut transform = ViewTransform::new(1000.0, 1000.0).unwrap();
    transform.resize(800.0, 600.0);
    ViewerState::shared(EntityTable::new(MapGeometry::default()), transform)
}

fn session_with(
    scripts: Vec<Vec<Result<Bytes, SessionError>>>,
) -> (
    ViewerSession<ScriptedConnector>,
    Arc<AtomicU64>,
    SharedViewerState,
) {
    let (connector, attempts) = ScriptedConnector::new(scripts);
    let shared = shared_state();
    let session = ViewerSession::new(
        connector,
        Arc::new(FrameSchema::deployed()),
        Arc::clone(&shared),
    )
    .with_reconnect_delay(Duration::from_millis(5));
    (session, attempts, shared)
}

/// Poll the shared state until `predicate` holds, under a deadline.
async fn wait_until<F>(shared: &SharedViewerState, mut predicate: F)
where
    F: FnMut(&EntityTable) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if predicate(&shared.read().await.entities) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn datagrams_flow_into_the_shared_entity_table() {
    let (session, _attempts, shared) = session_with(vec![vec![
        Ok(datagram(1, 1, 100.0, 50.0, 200)),
        Ok(datagram(2, 1, -300.0, 75.0, 10)),
    ]]);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(session.run(shutdown_rx));

    wait_until(&shared, |entities| entities.len() == 2).await;

    let guard = shared.read().await;
    let first = guard.entities.get(1).unwrap();
    assert!(first.race_has_been_on);
    assert_eq!(first.hue, 200);
    drop(guard);

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn undecodable_datagrams_are_skipped_without_dropping_the_stream() {
    let (session, _attempts, shared) = session_with(vec![vec![
        Ok(Bytes::from_static(b"junk")),
        Ok(datagram(5, 1, 0.0, 0.0, 33)),
    ]]);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(session.run(shutdown_rx));

    // The good datagram after the junk one still lands.
    wait_until(&shared, |entities| entities.get(5).is_some()).await;
    assert_eq!(shared.read().await.entities.len(), 1);

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn entity_state_survives_disconnects_and_failed_reconnects() {
    // One good connection, then a clean empty one, then failures forever.
    let (session, attempts, shared) = session_with(vec![
        vec![Ok(datagram(1, 1, 10.0, 20.0, 99))],
        vec![],
    ]);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(session.run(shutdown_rx));

    wait_until(&shared, |entities| entities.get(1).is_some()).await;

    // Retries continue unbounded after both scripted connections are gone.
    tokio::time::timeout(Duration::from_secs(2), async {
        while attempts.load(Ordering::SeqCst) < 4 {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap();

    // The entity from the first connection is still there.
    assert!(shared.read().await.entities.get(1).is_some());

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn reconnect_attempts_are_paced_by_the_fixed_delay() {
    // Every connect fails; attempts advance only as the delay elapses.
    let (session, attempts, _shared) = session_with(vec![]);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(session.run(shutdown_rx));

    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_millis(5)).await;
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn shutdown_stops_the_session_and_reports_disconnected() {
    let (session, _attempts, _shared) = session_with(vec![]);
    let state_rx = session.state();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(session.run(shutdown_rx));

    tokio::task::yield_now().await;
    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(*state_rx.borrow(), SessionState::Disconnected);
}

//! One open socket connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use atrium_core::{ConnectionId, ParticipantId};

/// The room-side handle to one open socket.
///
/// Holds the bounded send channel to the socket's write task. Identity is
/// resolved before the upgrade, so the participant binding is fixed at
/// construction.
pub struct SocketConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// The participant this socket belongs to.
    pub participant_id: ParticipantId,
    /// Send channel to the socket's write task.
    tx: mpsc::Sender<Arc<String>>,
    /// When this connection was established.
    pub opened_at: Instant,
    /// Whether the client has responded since the last ping.
    is_alive: AtomicBool,
    /// When the last Pong (or any activity) was received.
    last_pong: Mutex<Instant>,
    /// Count of events that could not be delivered.
    dropped_events: AtomicU64,
}

impl SocketConnection {
    /// Create a new connection.
    pub fn new(id: ConnectionId, participant_id: ParticipantId, tx: mpsc::Sender<Arc<String>>) -> Self {
        let now = Instant::now();
        Self {
            id,
            participant_id,
            tx,
            opened_at: now,
            is_alive: AtomicBool::new(true),
            last_pong: Mutex::new(now),
            dropped_events: AtomicU64::new(0),
        }
    }

    /// Deliver a serialized event to the socket.
    ///
    /// Returns `false` if the channel is full or closed. A `false` here is a
    /// transport failure: a socket that stopped draining its queue is
    /// indistinguishable from a dead one, and the room evicts it.
    pub fn send(&self, message: Arc<String>) -> bool {
        if self.tx.try_send(message).is_ok() {
            true
        } else {
            let _ = self.dropped_events.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Total events dropped for this connection.
    pub fn drop_count(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Mark the connection as alive (pong received).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_pong.lock() = Instant::now();
    }

    /// Duration since the last pong (or connection establishment).
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// Check and reset the alive flag for the heartbeat.
    ///
    /// Returns `true` if the connection was alive since the last check.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

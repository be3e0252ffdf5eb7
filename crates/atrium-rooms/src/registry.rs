//! Room registry: maps `(kind, room id)` to the exclusive owner of that
//! room's state, spawning the actor on first address.

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use atrium_core::{RoomId, RoomKind};

use crate::actor::{RoomHandle, spawn_room};

/// Default command queue depth per room.
pub const DEFAULT_ROOM_BUFFER: usize = 256;

struct RoomEntry {
    handle: RoomHandle,
    task: JoinHandle<()>,
}

/// Registry of live room actors.
///
/// Rooms are never evicted: a challenge room keeps score history while empty,
/// and the routing layer owns id validity. Eviction of long-idle rooms is an
/// extension point, not current behavior.
pub struct RoomRegistry {
    rooms: DashMap<(RoomKind, RoomId), RoomEntry>,
    buffer: usize,
    shutdown: CancellationToken,
}

impl RoomRegistry {
    /// Create a registry with its own shutdown token.
    #[must_use]
    pub fn new(buffer: usize) -> Self {
        Self::with_shutdown(buffer, CancellationToken::new())
    }

    /// Create a registry whose actors stop when `shutdown` fires.
    #[must_use]
    pub fn with_shutdown(buffer: usize, shutdown: CancellationToken) -> Self {
        Self {
            rooms: DashMap::new(),
            buffer,
            shutdown,
        }
    }

    /// Get the handle for a room, spawning its actor on first address.
    pub fn room(&self, kind: RoomKind, room_id: &RoomId) -> RoomHandle {
        self.rooms
            .entry((kind, room_id.clone()))
            .or_insert_with(|| {
                debug!(room_id = %room_id, kind = kind.as_str(), "spawning room actor");
                let (handle, task) = spawn_room(
                    kind,
                    room_id.clone(),
                    self.buffer,
                    self.shutdown.child_token(),
                );
                RoomEntry { handle, task }
            })
            .handle
            .clone()
    }

    /// Number of live rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no rooms have been spawned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// The registry's shutdown token.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Remove every room and return the actor tasks for draining.
    ///
    /// Used at shutdown: cancel the token, then await these handles.
    pub fn drain_tasks(&self) -> Vec<JoinHandle<()>> {
        let keys: Vec<_> = self.rooms.iter().map(|entry| entry.key().clone()).collect();
        keys.into_iter()
            .filter_map(|key| self.rooms.remove(&key))
            .map(|(_, entry)| entry.task)
            .collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_ROOM_BUFFER)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

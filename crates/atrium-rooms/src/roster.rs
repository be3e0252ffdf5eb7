//! Session registry and broadcast engine.
//!
//! The roster is the bidirectional mapping between open sockets and
//! participants, plus the best-effort fan-out over it. It is owned by a
//! single room actor and mutated only inside one command at a time, so the
//! maps are plain `HashMap`s with no interior locking.
//!
//! Broadcast is never atomic: a failed delivery is reported back to the
//! caller (the room evicts that socket and emits the departure events) and
//! never aborts delivery to the remaining sockets.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::warn;

use atrium_core::{ConnectionId, ParticipantId};
use atrium_protocol::ServerEvent;

use crate::connection::SocketConnection;

/// Session registry for one room.
#[derive(Default)]
pub struct Roster {
    /// Open sockets indexed by connection ID.
    connections: HashMap<ConnectionId, Arc<SocketConnection>>,
    /// Open connection IDs per participant.
    by_participant: HashMap<ParticipantId, HashSet<ConnectionId>>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an open socket.
    pub fn insert(&mut self, connection: Arc<SocketConnection>) {
        let _ = self
            .by_participant
            .entry(connection.participant_id.clone())
            .or_default()
            .insert(connection.id.clone());
        let _ = self.connections.insert(connection.id.clone(), connection);
    }

    /// Remove a socket, returning it if it was registered.
    ///
    /// Keeps `by_participant` in sync; the participant's entry is dropped
    /// with its last connection.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<Arc<SocketConnection>> {
        let connection = self.connections.remove(id)?;
        if let Some(ids) = self.by_participant.get_mut(&connection.participant_id) {
            let _ = ids.remove(id);
            if ids.is_empty() {
                let _ = self.by_participant.remove(&connection.participant_id);
            }
        }
        Some(connection)
    }

    /// Look up a registered socket.
    #[must_use]
    pub fn get(&self, id: &ConnectionId) -> Option<&Arc<SocketConnection>> {
        self.connections.get(id)
    }

    /// The participant bound to a socket, if the socket is registered.
    #[must_use]
    pub fn participant_of(&self, id: &ConnectionId) -> Option<ParticipantId> {
        self.connections.get(id).map(|c| c.participant_id.clone())
    }

    /// Number of open sockets for one participant.
    #[must_use]
    pub fn session_count(&self, participant_id: &ParticipantId) -> usize {
        self.by_participant
            .get(participant_id)
            .map_or(0, HashSet::len)
    }

    /// Number of open sockets in the room.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the room has no open sockets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Send an event to a single socket.
    ///
    /// Returns `false` if the socket is not registered or delivery failed.
    pub fn send_to(&self, id: &ConnectionId, event: &ServerEvent) -> bool {
        let Some(connection) = self.connections.get(id) else {
            return false;
        };
        let Some(json) = serialize(event) else {
            return false;
        };
        connection.send(json)
    }

    /// Fan an event out to every open socket except `exclude`.
    ///
    /// Serializes once and attempts delivery to each socket. Failed
    /// deliveries are collected and returned so the room can treat each as
    /// an implicit disconnect; they never stop the remaining sends.
    pub fn broadcast(
        &self,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> Vec<ConnectionId> {
        let Some(json) = serialize(event) else {
            return Vec::new();
        };
        let mut failed = Vec::new();
        for connection in self.connections.values() {
            if Some(&connection.id) == exclude {
                continue;
            }
            if !connection.send(Arc::clone(&json)) {
                warn!(
                    conn_id = %connection.id,
                    event_type = event.event_type(),
                    "failed to deliver event, scheduling eviction"
                );
                failed.push(connection.id.clone());
            }
        }
        failed
    }
}

fn serialize(event: &ServerEvent) -> Option<Arc<String>> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Arc::new(json)),
        Err(e) => {
            warn!(event_type = event.event_type(), error = %e, "failed to serialize event");
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn make_connection(
        conn: &str,
        user: &str,
    ) -> (Arc<SocketConnection>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(32);
        let connection = SocketConnection::new(
            ConnectionId::from(conn),
            ParticipantId::from(user),
            tx,
        );
        (Arc::new(connection), rx)
    }

    fn event() -> ServerEvent {
        ServerEvent::error("test")
    }

    #[test]
    fn insert_and_remove_keep_maps_in_sync() {
        let mut roster = Roster::new();
        let (c1, _rx1) = make_connection("c1", "u1");
        let (c2, _rx2) = make_connection("c2", "u1");
        roster.insert(c1);
        roster.insert(c2);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.session_count(&ParticipantId::from("u1")), 2);

        let removed = roster.remove(&ConnectionId::from("c1")).unwrap();
        assert_eq!(removed.id.as_str(), "c1");
        assert_eq!(roster.session_count(&ParticipantId::from("u1")), 1);

        let _ = roster.remove(&ConnectionId::from("c2")).unwrap();
        assert_eq!(roster.session_count(&ParticipantId::from("u1")), 0);
        assert!(roster.is_empty());
    }

    #[test]
    fn remove_unknown_returns_none() {
        let mut roster = Roster::new();
        assert!(roster.remove(&ConnectionId::from("ghost")).is_none());
    }

    #[test]
    fn participant_of_registered_socket() {
        let mut roster = Roster::new();
        let (c1, _rx1) = make_connection("c1", "u1");
        roster.insert(c1);
        assert_eq!(
            roster.participant_of(&ConnectionId::from("c1")),
            Some(ParticipantId::from("u1"))
        );
        assert!(roster.participant_of(&ConnectionId::from("c9")).is_none());
    }

    #[tokio::test]
    async fn broadcast_reaches_all_sockets() {
        let mut roster = Roster::new();
        let (c1, mut rx1) = make_connection("c1", "u1");
        let (c2, mut rx2) = make_connection("c2", "u2");
        roster.insert(c1);
        roster.insert(c2);

        let failed = roster.broadcast(&event(), None);
        assert!(failed.is_empty());
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn broadcast_excludes_one_socket() {
        let mut roster = Roster::new();
        let (c1, mut rx1) = make_connection("c1", "u1");
        let (c2, mut rx2) = make_connection("c2", "u2");
        roster.insert(c1);
        roster.insert(c2);

        let failed = roster.broadcast(&event(), Some(&ConnectionId::from("c1")));
        assert!(failed.is_empty());
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn broadcast_survives_one_dead_socket() {
        let mut roster = Roster::new();
        let (c1, mut rx1) = make_connection("c1", "u1");
        let (c2, rx2) = make_connection("c2", "u2");
        let (c3, mut rx3) = make_connection("c3", "u3");
        roster.insert(c1);
        roster.insert(c2);
        roster.insert(c3);
        drop(rx2);

        let failed = roster.broadcast(&event(), None);
        assert_eq!(failed, vec![ConnectionId::from("c2")]);
        // The two live sockets still received the event
        assert!(rx1.try_recv().is_ok());
        assert!(rx3.try_recv().is_ok());
    }

    #[tokio::test]
    async fn send_to_single_socket() {
        let mut roster = Roster::new();
        let (c1, mut rx1) = make_connection("c1", "u1");
        let (c2, mut rx2) = make_connection("c2", "u2");
        roster.insert(c1);
        roster.insert(c2);

        assert!(roster.send_to(&ConnectionId::from("c1"), &event()));
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn send_to_unknown_socket_returns_false() {
        let roster = Roster::new();
        assert!(!roster.send_to(&ConnectionId::from("ghost"), &event()));
    }

    #[tokio::test]
    async fn broadcast_payload_is_the_envelope() {
        let mut roster = Roster::new();
        let (c1, mut rx1) = make_connection("c1", "u1");
        roster.insert(c1);

        let _ = roster.broadcast(&ServerEvent::error("oops"), None);
        let json = rx1.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["type"], "error");
        assert_eq!(v["data"]["message"], "oops");
    }
}

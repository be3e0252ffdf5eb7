//! Chat room behavior: capped message history, typing indicators, system
//! messages.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use atrium_core::constants::{HISTORY_CAP, MAX_MESSAGE_LEN, SNAPSHOT_HISTORY_LIMIT};
use atrium_core::{
    ChatMessage, ConnectionId, MessageId, MessageKind, Participant, ParticipantId, RoomId,
};
use atrium_protocol::{ClientFrame, ServerEvent};

use crate::command::Identity;
use crate::connection::SocketConnection;
use crate::roster::Roster;

/// A chat room. Participants exist only while connected; history is a
/// capped FIFO log ordered by arrival at this room.
pub struct ChatRoom {
    id: RoomId,
    roster: Roster,
    participants: HashMap<ParticipantId, Participant>,
    history: VecDeque<ChatMessage>,
}

impl ChatRoom {
    /// Create an empty chat room.
    #[must_use]
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            roster: Roster::new(),
            participants: HashMap::new(),
            history: VecDeque::new(),
        }
    }

    /// Admit an accepted socket.
    ///
    /// Sends the snapshot (recent history + participant list) to the new
    /// socket only, then announces the join to every other socket.
    pub fn connect(&mut self, connection: Arc<SocketConnection>, identity: Identity) {
        let participant = self
            .participants
            .entry(identity.user_id.clone())
            .or_insert_with(|| {
                Participant::new(
                    identity.user_id.clone(),
                    identity.username.clone(),
                    identity.avatar_url.clone(),
                )
            });
        // Reconnects refresh the display identity
        participant.username = identity.username;
        participant.avatar_url = identity.avatar_url;
        participant.touch();
        let joined = participant.clone();

        let connection_id = connection.id.clone();
        self.roster.insert(connection);
        debug!(room_id = %self.id, user_id = %joined.id, "participant connected to chat");

        let (messages, total) = self.history_page(SNAPSHOT_HISTORY_LIMIT, 0);
        let _ = self
            .roster
            .send_to(&connection_id, &ServerEvent::MessageHistory { messages, total });
        let _ = self.roster.send_to(
            &connection_id,
            &ServerEvent::UsersList {
                users: self.participants(),
            },
        );

        let failed = self
            .roster
            .broadcast(&ServerEvent::UserJoined { user: joined }, Some(&connection_id));
        self.reap(failed);
    }

    /// Handle a socket close.
    ///
    /// When the participant's last socket closes, the participant is deleted
    /// and the room announces the departure (system message + `user_left`).
    pub fn disconnect(&mut self, connection_id: &ConnectionId) {
        let failed = self.remove_session(connection_id);
        self.reap(failed);
    }

    /// Dispatch a parsed client frame.
    pub fn handle_frame(&mut self, connection_id: &ConnectionId, frame: ClientFrame) {
        match frame {
            ClientFrame::SendMessage(payload) => {
                self.send_message(connection_id, &payload.message, payload.kind);
            }
            ClientFrame::TypingStart => self.typing(connection_id, true),
            ClientFrame::TypingStop => self.typing(connection_id, false),
            other => self.send_error(
                connection_id,
                format!("unsupported message type for chat room: {}", other.frame_type()),
            ),
        }
    }

    /// Answer a single socket with an `error` event.
    pub fn send_error(&self, connection_id: &ConnectionId, message: String) {
        let _ = self.roster.send_to(connection_id, &ServerEvent::error(message));
    }

    /// The most recent `limit` messages after skipping `offset` from the
    /// end, oldest first, plus the total stored count.
    #[must_use]
    pub fn history_page(&self, limit: usize, offset: usize) -> (Vec<ChatMessage>, usize) {
        let total = self.history.len();
        let end = total.saturating_sub(offset);
        let start = end.saturating_sub(limit);
        let page = self
            .history
            .iter()
            .skip(start)
            .take(end - start)
            .cloned()
            .collect();
        (page, total)
    }

    /// Current participants.
    #[must_use]
    pub fn participants(&self) -> Vec<Participant> {
        self.participants.values().cloned().collect()
    }

    /// Number of open sockets.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.roster.len()
    }

    fn send_message(&mut self, sender: &ConnectionId, body: &str, kind: MessageKind) {
        let body = body.trim();
        // Empty and oversized messages are dropped without an error
        if body.is_empty() || body.chars().count() > MAX_MESSAGE_LEN {
            return;
        }
        let Some(participant_id) = self.roster.participant_of(sender) else {
            return;
        };
        let username = match self.participants.get_mut(&participant_id) {
            Some(p) => {
                p.touch();
                p.username.clone()
            }
            None => return,
        };

        let message = ChatMessage {
            id: MessageId::new(),
            user_id: participant_id,
            username,
            message: body.to_owned(),
            kind,
            created_at: Utc::now(),
        };
        self.push_history(message.clone());
        let failed = self.roster.broadcast(&ServerEvent::NewMessage { message }, None);
        self.reap(failed);
    }

    fn typing(&mut self, sender: &ConnectionId, started: bool) {
        let Some(participant_id) = self.roster.participant_of(sender) else {
            return;
        };
        let username = match self.participants.get_mut(&participant_id) {
            Some(p) => {
                p.touch();
                p.username.clone()
            }
            None => return,
        };
        let event = if started {
            ServerEvent::TypingStart {
                user_id: participant_id,
                username,
            }
        } else {
            ServerEvent::TypingStop {
                user_id: participant_id,
                username,
            }
        };
        let failed = self.roster.broadcast(&event, Some(sender));
        self.reap(failed);
    }

    /// Append to the capped log, evicting the oldest entry beyond the cap.
    fn push_history(&mut self, message: ChatMessage) {
        self.history.push_back(message);
        if self.history.len() > HISTORY_CAP {
            let _ = self.history.pop_front();
        }
    }

    /// Remove one session; returns broadcast failures for the caller to reap.
    fn remove_session(&mut self, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        let Some(connection) = self.roster.remove(connection_id) else {
            return Vec::new();
        };
        let participant_id = connection.participant_id.clone();
        if self.roster.session_count(&participant_id) > 0 {
            // Another socket of the same participant is still open
            return Vec::new();
        }
        let Some(participant) = self.participants.remove(&participant_id) else {
            return Vec::new();
        };
        debug!(room_id = %self.id, user_id = %participant_id, "participant left chat");

        let notice = ChatMessage {
            id: MessageId::new(),
            user_id: participant_id.clone(),
            username: participant.username.clone(),
            message: format!("{} left the chat", participant.username),
            kind: MessageKind::System,
            created_at: Utc::now(),
        };
        self.push_history(notice.clone());
        let mut failed = self
            .roster
            .broadcast(&ServerEvent::NewMessage { message: notice }, None);
        failed.extend(self.roster.broadcast(
            &ServerEvent::UserLeft {
                user_id: participant_id,
                username: participant.username,
            },
            None,
        ));
        failed
    }

    /// Treat failed deliveries as implicit disconnects until none remain.
    fn reap(&mut self, mut failed: Vec<ConnectionId>) {
        while let Some(connection_id) = failed.pop() {
            failed.extend(self.remove_session(&connection_id));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

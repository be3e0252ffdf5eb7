//! The per-room actor: one task owns the room state and handles commands
//! serially, so no command ever observes another mid-mutation.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use atrium_core::{
    ChallengeParticipant, ChatMessage, ConnectionId, Participant, ParticipantId, RoomError,
    RoomId, RoomKind, Submission, SubmissionId,
};
use atrium_protocol::ClientFrame;

use crate::challenge::ChallengeRoom;
use crate::chat::ChatRoom;
use crate::command::{Identity, RoomCommand};
use crate::connection::SocketConnection;

/// The state owned by one room actor.
enum Room {
    Chat(ChatRoom),
    Challenge(ChallengeRoom),
}

impl Room {
    fn new(kind: RoomKind, id: RoomId) -> Self {
        match kind {
            RoomKind::Chat => Self::Chat(ChatRoom::new(id)),
            RoomKind::Challenge => Self::Challenge(ChallengeRoom::new(id)),
        }
    }

    fn connect(&mut self, connection: Arc<SocketConnection>, identity: Identity) {
        match self {
            Self::Chat(room) => room.connect(connection, identity),
            Self::Challenge(room) => room.connect(connection, identity),
        }
    }

    fn disconnect(&mut self, connection_id: &ConnectionId) {
        match self {
            Self::Chat(room) => room.disconnect(connection_id),
            Self::Challenge(room) => room.disconnect(connection_id),
        }
    }

    /// Parse and dispatch one raw text frame. A frame that fails to parse is
    /// answered with a single `error` event to the sender; room state is
    /// untouched.
    fn frame(&mut self, connection_id: &ConnectionId, text: &str) {
        match ClientFrame::parse(text) {
            Ok(frame) => match self {
                Self::Chat(room) => room.handle_frame(connection_id, frame),
                Self::Challenge(room) => room.handle_frame(connection_id, frame),
            },
            Err(err) => match self {
                Self::Chat(room) => room.send_error(connection_id, err.to_string()),
                Self::Challenge(room) => room.send_error(connection_id, err.to_string()),
            },
        }
    }

    #[allow(clippy::too_many_lines)]
    fn handle(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Connect {
                connection,
                identity,
            } => self.connect(connection, identity),
            RoomCommand::Disconnect { connection_id } => self.disconnect(&connection_id),
            RoomCommand::Frame {
                connection_id,
                text,
            } => self.frame(&connection_id, &text),
            RoomCommand::History {
                limit,
                offset,
                reply,
            } => {
                let page = match self {
                    Self::Chat(room) => room.history_page(limit, offset),
                    Self::Challenge(_) => (Vec::new(), 0),
                };
                let _ = reply.send(page);
            }
            RoomCommand::Users { reply } => {
                let users = match self {
                    Self::Chat(room) => room.participants(),
                    Self::Challenge(_) => Vec::new(),
                };
                let _ = reply.send(users);
            }
            RoomCommand::Participants { reply } => {
                let participants = match self {
                    Self::Challenge(room) => room.participants(),
                    Self::Chat(_) => Vec::new(),
                };
                let _ = reply.send(participants);
            }
            RoomCommand::Submissions { reply } => {
                let submissions = match self {
                    Self::Challenge(room) => room.submissions(),
                    Self::Chat(_) => Vec::new(),
                };
                let _ = reply.send(submissions);
            }
            RoomCommand::Leaderboard { reply } => {
                let standings = match self {
                    Self::Challenge(room) => room.leaderboard(),
                    Self::Chat(_) => Vec::new(),
                };
                let _ = reply.send(standings);
            }
            RoomCommand::Submit {
                participant_id,
                content,
                file_url,
                reply,
            } => {
                let result = match self {
                    Self::Challenge(room) => room.submit(&participant_id, &content, file_url),
                    Self::Chat(_) => Err(not_a_challenge_room()),
                };
                let _ = reply.send(result);
            }
            RoomCommand::Vote {
                participant_id,
                submission_id,
                reply,
            } => {
                let result = match self {
                    Self::Challenge(room) => room.vote(&participant_id, &submission_id),
                    Self::Chat(_) => Err(not_a_challenge_room()),
                };
                let _ = reply.send(result);
            }
            RoomCommand::End { reply } => {
                let result = match self {
                    Self::Challenge(room) => {
                        let _ = room.end();
                        Ok(())
                    }
                    Self::Chat(_) => Err(not_a_challenge_room()),
                };
                let _ = reply.send(result);
            }
        }
    }
}

fn not_a_challenge_room() -> RoomError {
    RoomError::invalid_operation("not a challenge room")
}

/// Addressable handle to a running room actor.
#[derive(Clone)]
pub struct RoomHandle {
    kind: RoomKind,
    room_id: RoomId,
    tx: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room's variant.
    #[must_use]
    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    /// The room's id.
    #[must_use]
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Enqueue a command for the actor.
    pub async fn send(&self, command: RoomCommand) -> Result<(), RoomError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Admit an accepted socket.
    pub async fn connect(
        &self,
        connection: Arc<SocketConnection>,
        identity: Identity,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Connect {
            connection,
            identity,
        })
        .await
    }

    /// Report a closed socket.
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Result<(), RoomError> {
        self.send(RoomCommand::Disconnect { connection_id }).await
    }

    /// Forward one raw client frame.
    pub async fn frame(&self, connection_id: ConnectionId, text: String) -> Result<(), RoomError> {
        self.send(RoomCommand::Frame {
            connection_id,
            text,
        })
        .await
    }

    /// Chat history page plus total stored count.
    pub async fn history(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<ChatMessage>, usize), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::History {
            limit,
            offset,
            reply,
        })
        .await?;
        rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Chat participant list.
    pub async fn users(&self) -> Result<Vec<Participant>, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Users { reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Challenge participant list.
    pub async fn participants(&self) -> Result<Vec<ChallengeParticipant>, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Participants { reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Submission list in arrival order.
    pub async fn submissions(&self) -> Result<Vec<Submission>, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Submissions { reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Full sorted leaderboard.
    pub async fn leaderboard(&self) -> Result<Vec<ChallengeParticipant>, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Leaderboard { reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Server-initiated submission.
    pub async fn submit(
        &self,
        participant_id: ParticipantId,
        content: String,
        file_url: Option<String>,
    ) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Submit {
            participant_id,
            content,
            file_url,
            reply,
        })
        .await?;
        rx.await.map_err(|_| RoomError::Unavailable)?
    }

    /// Server-initiated vote.
    pub async fn vote(
        &self,
        participant_id: ParticipantId,
        submission_id: SubmissionId,
    ) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Vote {
            participant_id,
            submission_id,
            reply,
        })
        .await?;
        rx.await.map_err(|_| RoomError::Unavailable)?
    }

    /// End the challenge (idempotent).
    pub async fn end(&self) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::End { reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable)?
    }
}

/// Spawn a room actor; returns its handle and the task driving it.
///
/// The task drains commands until every handle is dropped or the shutdown
/// token fires.
pub(crate) fn spawn_room(
    kind: RoomKind,
    room_id: RoomId,
    buffer: usize,
    shutdown: CancellationToken,
) -> (RoomHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(buffer);
    let mut room = Room::new(kind, room_id.clone());
    let id_for_task = room_id.clone();

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                command = rx.recv() => match command {
                    Some(command) => room.handle(command),
                    None => break,
                },
            }
        }
        debug!(room_id = %id_for_task, "room actor stopped");
    });

    (
        RoomHandle {
            kind,
            room_id,
            tx,
        },
        task,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tokio::sync::mpsc as tokio_mpsc;

    fn identity(user: &str) -> Identity {
        Identity {
            user_id: ParticipantId::from(user),
            username: user.to_uppercase(),
            avatar_url: None,
        }
    }

    fn socket(conn: &str, user: &str) -> (Arc<SocketConnection>, tokio_mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = tokio_mpsc::channel(256);
        (
            Arc::new(SocketConnection::new(
                ConnectionId::from(conn),
                ParticipantId::from(user),
                tx,
            )),
            rx,
        )
    }

    fn spawn(kind: RoomKind) -> (RoomHandle, JoinHandle<()>) {
        spawn_room(kind, RoomId::from("r1"), 64, CancellationToken::new())
    }

    #[tokio::test]
    async fn commands_are_processed_in_order() {
        let (handle, _task) = spawn(RoomKind::Chat);
        let (connection, mut rx) = socket("c1", "u1");
        handle.connect(connection, identity("u1")).await.unwrap();

        handle
            .frame(
                ConnectionId::from("c1"),
                r#"{"type":"send_message","data":{"message":"first"}}"#.into(),
            )
            .await
            .unwrap();
        handle
            .frame(
                ConnectionId::from("c1"),
                r#"{"type":"send_message","data":{"message":"second"}}"#.into(),
            )
            .await
            .unwrap();

        // The query is queued behind both frames, so it observes them
        let (page, total) = handle.history(10, 0).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page[0].message, "first");
        assert_eq!(page[1].message, "second");
        // The snapshot plus two broadcasts arrived on the socket
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn malformed_frame_earns_error_event() {
        let (handle, _task) = spawn(RoomKind::Chat);
        let (connection, mut rx) = socket("c1", "u1");
        handle.connect(connection, identity("u1")).await.unwrap();
        // Drain the connect snapshot (history + users list)
        let _ = rx.recv().await;
        let _ = rx.recv().await;

        handle
            .frame(ConnectionId::from("c1"), "{broken".into())
            .await
            .unwrap();

        let json = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["type"], "error");

        // Room state is untouched
        let (_, total) = handle.history(10, 0).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn challenge_control_flow_round_trip() {
        let (handle, _task) = spawn(RoomKind::Challenge);
        let (connection, _rx) = socket("c1", "a");
        handle.connect(connection, identity("a")).await.unwrap();

        handle
            .submit(ParticipantId::from("a"), "entry".into(), None)
            .await
            .unwrap();
        let submissions = handle.submissions().await.unwrap();
        assert_eq!(submissions.len(), 1);

        let standings = handle.leaderboard().await.unwrap();
        assert_eq!(standings[0].score, 10);

        handle.end().await.unwrap();
        // End is idempotent through the handle too
        handle.end().await.unwrap();
    }

    #[tokio::test]
    async fn vote_error_propagates_through_handle() {
        let (handle, _task) = spawn(RoomKind::Challenge);
        let (connection, _rx) = socket("c1", "a");
        handle.connect(connection, identity("a")).await.unwrap();

        let err = handle
            .vote(ParticipantId::from("a"), SubmissionId::from("ghost"))
            .await
            .unwrap_err();
        assert_matches!(err, RoomError::NotFound { .. });
    }

    #[tokio::test]
    async fn kind_mismatch_yields_empty_or_invalid() {
        let (chat, _t1) = spawn(RoomKind::Chat);
        let (challenge, _t2) = spawn(RoomKind::Challenge);

        assert!(chat.submissions().await.unwrap().is_empty());
        assert_matches!(
            chat.end().await.unwrap_err(),
            RoomError::InvalidOperation { .. }
        );
        let (_, total) = challenge.history(10, 0).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn shutdown_token_stops_the_actor() {
        let token = CancellationToken::new();
        let (handle, task) =
            spawn_room(RoomKind::Chat, RoomId::from("r1"), 8, token.clone());
        token.cancel();
        task.await.unwrap();

        let err = handle
            .frame(ConnectionId::from("c1"), "{}".into())
            .await
            .unwrap_err();
        assert_matches!(err, RoomError::Unavailable);
    }

    #[tokio::test]
    async fn disconnect_through_handle_updates_roster() {
        let (handle, _task) = spawn(RoomKind::Chat);
        let (connection, _rx) = socket("c1", "u1");
        handle.connect(connection, identity("u1")).await.unwrap();
        assert_eq!(handle.users().await.unwrap().len(), 1);

        handle.disconnect(ConnectionId::from("c1")).await.unwrap();
        assert!(handle.users().await.unwrap().is_empty());
    }
}

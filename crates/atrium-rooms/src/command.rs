//! Commands accepted by a room actor.
//!
//! Everything that touches room state flows through [`RoomCommand`] on the
//! room's channel and is handled serially. Request/response operations
//! (the control surface) carry a `oneshot` reply sender; socket-driven
//! operations reply, when they reply at all, through the socket itself.

use std::sync::Arc;

use tokio::sync::oneshot;

use atrium_core::{
    ChallengeParticipant, ChatMessage, ConnectionId, Participant, ParticipantId, RoomError,
    Submission, SubmissionId,
};

use crate::connection::SocketConnection;

/// Identity parameters resolved by the upstream layer, passed as trusted
/// input at admission.
#[derive(Clone, Debug)]
pub struct Identity {
    /// Opaque user id.
    pub user_id: ParticipantId,
    /// Display name.
    pub username: String,
    /// Optional avatar reference.
    pub avatar_url: Option<String>,
}

/// One unit of work for a room actor.
pub enum RoomCommand {
    /// Admit an accepted socket.
    Connect {
        /// The new socket.
        connection: Arc<SocketConnection>,
        /// Trusted identity parameters.
        identity: Identity,
    },
    /// A socket closed (or failed a send and is being evicted).
    Disconnect {
        /// The closed socket.
        connection_id: ConnectionId,
    },
    /// A raw text frame arrived from a socket.
    Frame {
        /// The sender.
        connection_id: ConnectionId,
        /// The raw frame text.
        text: String,
    },
    /// Chat: page of recent history plus the total stored count.
    History {
        /// Page size.
        limit: usize,
        /// Messages to skip, counted from the end.
        offset: usize,
        /// Reply channel.
        reply: oneshot::Sender<(Vec<ChatMessage>, usize)>,
    },
    /// Chat: current participant list.
    Users {
        /// Reply channel.
        reply: oneshot::Sender<Vec<Participant>>,
    },
    /// Challenge: all tracked participants.
    Participants {
        /// Reply channel.
        reply: oneshot::Sender<Vec<ChallengeParticipant>>,
    },
    /// Challenge: all submissions in arrival order.
    Submissions {
        /// Reply channel.
        reply: oneshot::Sender<Vec<Submission>>,
    },
    /// Challenge: full sorted leaderboard.
    Leaderboard {
        /// Reply channel.
        reply: oneshot::Sender<Vec<ChallengeParticipant>>,
    },
    /// Challenge: server-initiated submission.
    Submit {
        /// Author; must be tracked by the room.
        participant_id: ParticipantId,
        /// Submission content.
        content: String,
        /// Optional file reference.
        file_url: Option<String>,
        /// Reply channel.
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    /// Challenge: server-initiated vote.
    Vote {
        /// The voter; must be tracked by the room.
        participant_id: ParticipantId,
        /// Target submission.
        submission_id: SubmissionId,
        /// Reply channel.
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    /// Challenge: end the challenge (idempotent).
    End {
        /// Reply channel.
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
}

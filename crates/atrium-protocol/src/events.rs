//! Server→client events.
//!
//! `ServerEvent` covers every event the coordinator pushes: connect
//! snapshots (sent to the new socket only), join/leave notifications, chat
//! and challenge activity, and the single `error` event answered to a
//! sender whose frame could not be handled. The serde tag/content attributes
//! produce exactly the `{type, data}` envelope.

use serde::{Deserialize, Serialize};

use atrium_core::{
    ChallengeParticipant, ChallengePhase, ChatMessage, Participant, ParticipantId, Submission,
    SubmissionId,
};

/// An event pushed to one or more sockets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Chat connect snapshot: recent history.
    MessageHistory {
        /// Most recent messages, oldest first.
        messages: Vec<ChatMessage>,
        /// Total messages currently stored.
        total: usize,
    },
    /// Chat connect snapshot: current participants.
    UsersList {
        /// Current participants.
        users: Vec<Participant>,
    },
    /// Challenge connect snapshot: full room state.
    ChallengeState {
        /// Lifecycle phase.
        status: ChallengePhase,
        /// All tracked participants, connected or not.
        participants: Vec<ChallengeParticipant>,
        /// All submissions in arrival order.
        submissions: Vec<Submission>,
    },
    /// A participant joined a chat room.
    UserJoined {
        /// The new participant.
        user: Participant,
    },
    /// A participant left a chat room.
    UserLeft {
        /// Departed participant id.
        user_id: ParticipantId,
        /// Departed participant display name.
        username: String,
    },
    /// A participant joined a challenge room.
    ParticipantJoined {
        /// The joining participant (score retained across reconnects).
        participant: ChallengeParticipant,
    },
    /// A participant's last socket left a challenge room.
    ParticipantLeft {
        /// Departed participant id.
        user_id: ParticipantId,
    },
    /// A chat message was appended to history.
    NewMessage {
        /// The stored message.
        message: ChatMessage,
    },
    /// A participant started typing.
    TypingStart {
        /// Typist id.
        user_id: ParticipantId,
        /// Typist display name.
        username: String,
    },
    /// A participant stopped typing.
    TypingStop {
        /// Typist id.
        user_id: ParticipantId,
        /// Typist display name.
        username: String,
    },
    /// A submission was accepted.
    NewSubmission {
        /// The new submission.
        submission: Submission,
    },
    /// A vote was recorded.
    VoteCast {
        /// Target submission.
        submission_id: SubmissionId,
        /// Updated vote count.
        vote_count: u32,
        /// Who voted.
        voter_id: ParticipantId,
    },
    /// Reply to a socket-originated leaderboard request (top 10).
    Leaderboard {
        /// Sorted standings, best first.
        leaderboard: Vec<ChallengeParticipant>,
    },
    /// The challenge ended; carries the full final standings.
    ChallengeEnded {
        /// Full sorted standings, best first.
        leaderboard: Vec<ChallengeParticipant>,
    },
    /// Answered to a single sender whose frame could not be handled.
    Error {
        /// Human-readable description.
        message: String,
    },
}

impl ServerEvent {
    /// The wire name of this event.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageHistory { .. } => "message_history",
            Self::UsersList { .. } => "users_list",
            Self::ChallengeState { .. } => "challenge_state",
            Self::UserJoined { .. } => "user_joined",
            Self::UserLeft { .. } => "user_left",
            Self::ParticipantJoined { .. } => "participant_joined",
            Self::ParticipantLeft { .. } => "participant_left",
            Self::NewMessage { .. } => "new_message",
            Self::TypingStart { .. } => "typing_start",
            Self::TypingStop { .. } => "typing_stop",
            Self::NewSubmission { .. } => "new_submission",
            Self::VoteCast { .. } => "vote_cast",
            Self::Leaderboard { .. } => "leaderboard",
            Self::ChallengeEnded { .. } => "challenge_ended",
            Self::Error { .. } => "error",
        }
    }

    /// Build an `error` event.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

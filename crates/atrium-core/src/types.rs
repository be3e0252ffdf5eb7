//! Domain types owned by a room instance.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, ParticipantId, SubmissionId};

/// The two room variants the coordinator hosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    /// Message history, typing indicators, system messages.
    Chat,
    /// Submissions, votes, scoring, two-state lifecycle.
    Challenge,
}

impl RoomKind {
    /// Path segment used in routes (`chat` / `challenge`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Challenge => "challenge",
        }
    }
}

/// A user with an active or historical presence in a room.
///
/// Created on first admission and looked up by id thereafter. Chat rooms
/// delete the record when the participant's last socket closes; challenge
/// rooms retain it for score history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Opaque user id resolved upstream.
    pub id: ParticipantId,
    /// Display name.
    pub username: String,
    /// Optional avatar reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// When this participant first joined the room.
    pub joined_at: DateTime<Utc>,
    /// Last message, typing, submission, or vote activity.
    pub last_activity: DateTime<Utc>,
}

impl Participant {
    /// Create a participant joining now.
    #[must_use]
    pub fn new(id: ParticipantId, username: String, avatar_url: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            avatar_url,
            joined_at: now,
            last_activity: now,
        }
    }

    /// Record activity at the current server time.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

/// A challenge-room participant: presence plus score bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeParticipant {
    /// Shared presence fields, serialized flat.
    #[serde(flatten)]
    pub info: Participant,
    /// Accumulated score. Starts at 0.
    pub score: i64,
    /// Number of submissions authored. Starts at 0.
    pub submission_count: u32,
}

impl ChallengeParticipant {
    /// Create a zero-score participant joining now.
    #[must_use]
    pub fn new(id: ParticipantId, username: String, avatar_url: Option<String>) -> Self {
        Self {
            info: Participant::new(id, username, avatar_url),
            score: 0,
            submission_count: 0,
        }
    }
}

/// Chat message kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text (the default).
    #[default]
    Text,
    /// Image reference.
    Image,
    /// File reference.
    File,
    /// Server-generated notice (e.g. departure messages).
    System,
}

/// One entry in a room's capped, append-only message log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message id, assigned by the room.
    pub id: MessageId,
    /// Author id.
    pub user_id: ParticipantId,
    /// Author display name at send time.
    pub username: String,
    /// Message body.
    pub message: String,
    /// Message kind.
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    /// Server-assigned timestamp.
    pub created_at: DateTime<Utc>,
}

/// A challenge entry authored by a participant.
///
/// Invariants, enforced by the owning room: `vote_count == voters.len()`,
/// and the author's id is never a member of `voters`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Submission id, assigned by the room.
    pub id: SubmissionId,
    /// Author id.
    pub user_id: ParticipantId,
    /// Author display name at submission time.
    pub username: String,
    /// Submission content.
    pub content: String,
    /// Optional file reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Server-assigned timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Number of votes received.
    pub vote_count: u32,
    /// Ids of participants who voted.
    pub voters: HashSet<ParticipantId>,
}

impl Submission {
    /// Create a submission with no votes.
    #[must_use]
    pub fn new(
        user_id: ParticipantId,
        username: String,
        content: String,
        file_url: Option<String>,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            user_id,
            username,
            content,
            file_url,
            submitted_at: Utc::now(),
            vote_count: 0,
            voters: HashSet::new(),
        }
    }
}

/// Challenge lifecycle. `Active` is initial; `Ended` is terminal and reached
/// only via the explicit end operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengePhase {
    /// Submissions and votes are accepted.
    #[default]
    Active,
    /// Terminal; all mutating operations are no-ops.
    Ended,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

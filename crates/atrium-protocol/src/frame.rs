//! Client→server socket frames.
//!
//! Parsing is two-step: first the raw `{type, data}` envelope, then the
//! per-type payload. A frame whose `type` is not recognized parses the
//! envelope successfully but yields [`FrameError::UnknownType`], so the
//! session loop can answer with a single `error` event naming the type
//! while leaving room state untouched.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use atrium_core::{MessageKind, SubmissionId};

/// Raw socket envelope.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    frame_type: String,
    #[serde(default)]
    data: Value,
}

/// Payload of `send_message`.
#[derive(Clone, Debug, Deserialize)]
pub struct SendMessagePayload {
    /// Message body.
    pub message: String,
    /// Message kind; defaults to text.
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
}

/// Payload of `submit_entry`.
#[derive(Clone, Debug, Deserialize)]
pub struct SubmitEntryPayload {
    /// Submission content.
    pub content: String,
    /// Optional file reference.
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Payload of `cast_vote`.
#[derive(Clone, Debug, Deserialize)]
pub struct CastVotePayload {
    /// Target submission.
    pub submission_id: SubmissionId,
}

/// A recognized client→server frame.
#[derive(Clone, Debug)]
pub enum ClientFrame {
    /// Chat: post a message.
    SendMessage(SendMessagePayload),
    /// Chat: the sender started typing.
    TypingStart,
    /// Chat: the sender stopped typing.
    TypingStop,
    /// Challenge: submit an entry.
    SubmitEntry(SubmitEntryPayload),
    /// Challenge: vote on a submission.
    CastVote(CastVotePayload),
    /// Challenge: request the top of the leaderboard.
    GetLeaderboard,
}

/// Why a client frame failed to parse.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The text was not a valid `{type, data}` envelope.
    #[error("invalid message: {0}")]
    Envelope(#[from] serde_json::Error),

    /// The envelope parsed but the `type` is not recognized.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// The `data` payload did not match the recognized `type`.
    #[error("invalid {frame_type} payload: {source}")]
    Payload {
        /// The frame type whose payload was malformed.
        frame_type: &'static str,
        /// The underlying deserialization error.
        source: serde_json::Error,
    },
}

impl ClientFrame {
    /// Parse a raw socket text frame.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let raw: RawFrame = serde_json::from_str(text)?;

        fn payload<T: serde::de::DeserializeOwned>(
            frame_type: &'static str,
            data: Value,
        ) -> Result<T, FrameError> {
            serde_json::from_value(data).map_err(|source| FrameError::Payload { frame_type, source })
        }

        match raw.frame_type.as_str() {
            "send_message" => Ok(Self::SendMessage(payload("send_message", raw.data)?)),
            "typing_start" => Ok(Self::TypingStart),
            "typing_stop" => Ok(Self::TypingStop),
            "submit_entry" => Ok(Self::SubmitEntry(payload("submit_entry", raw.data)?)),
            "cast_vote" => Ok(Self::CastVote(payload("cast_vote", raw.data)?)),
            "get_leaderboard" => Ok(Self::GetLeaderboard),
            other => Err(FrameError::UnknownType(other.to_owned())),
        }
    }

    /// The wire name of this frame.
    #[must_use]
    pub fn frame_type(&self) -> &'static str {
        match self {
            Self::SendMessage(_) => "send_message",
            Self::TypingStart => "typing_start",
            Self::TypingStop => "typing_stop",
            Self::SubmitEntry(_) => "submit_entry",
            Self::CastVote(_) => "cast_vote",
            Self::GetLeaderboard => "get_leaderboard",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

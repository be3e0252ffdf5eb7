//! Error types for room operations.
//!
//! `RoomError` is the library-level error the control surface maps to HTTP
//! statuses. The socket path deliberately swallows most of these (the
//! coordinator answers malformed frames with a single `error` event and
//! ignores invariant violations), so the variants carry wire codes rather
//! than transport concerns.

use thiserror::Error;

// ── Wire error codes ────────────────────────────────────────────────

/// Invalid or missing parameters.
pub const INVALID_PARAMS: &str = "INVALID_PARAMS";
/// Resource not found.
pub const NOT_FOUND: &str = "NOT_FOUND";
/// Operation not valid in the current state.
pub const INVALID_OPERATION: &str = "INVALID_OPERATION";
/// The room actor is gone (shutdown in progress).
pub const ROOM_UNAVAILABLE: &str = "ROOM_UNAVAILABLE";

/// Error returned by room operations.
#[derive(Debug, Error)]
pub enum RoomError {
    /// Required parameter missing or rejected by validation.
    #[error("{message}")]
    InvalidParams {
        /// Human-readable description.
        message: String,
    },

    /// The addressed entity does not exist in this room.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (`participant`, `submission`).
        entity: &'static str,
        /// The id that failed to resolve.
        id: String,
    },

    /// The operation violates a room invariant (self-vote, repeat vote).
    #[error("{message}")]
    InvalidOperation {
        /// Human-readable description.
        message: String,
    },

    /// The room's command channel is closed.
    #[error("room is unavailable")]
    Unavailable,
}

impl RoomError {
    /// Build an `InvalidParams` error.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Build a `NotFound` error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Build an `InvalidOperation` error.
    #[must_use]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Machine-readable wire code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParams { .. } => INVALID_PARAMS,
            Self::NotFound { .. } => NOT_FOUND,
            Self::InvalidOperation { .. } => INVALID_OPERATION,
            Self::Unavailable => ROOM_UNAVAILABLE,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

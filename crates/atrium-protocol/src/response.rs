//! REST control-surface response envelopes.

use serde::{Deserialize, Serialize};

use atrium_core::ChatMessage;

/// Structured error body inside an [`ApiResponse`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable code (e.g. `NOT_FOUND`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// The `{success, data?, error?}` envelope used by every control route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    pub success: bool,
    /// Result payload (present when `success == true` and there is data).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error payload (present when `success == false`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    /// Build a success response with data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Build a success response with no payload (accepted no-ops included).
    #[must_use]
    pub fn accepted() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// Build an error response.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// Response of `GET /rooms/chat/{room_id}/messages` — the envelope plus the
/// total stored count for pagination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessagesResponse {
    /// Always `true`; failures use the plain envelope.
    pub success: bool,
    /// The requested page, oldest first.
    pub data: Vec<ChatMessage>,
    /// Total messages currently stored in the room.
    pub total: usize,
}

impl MessagesResponse {
    /// Build a page response.
    #[must_use]
    pub fn new(data: Vec<ChatMessage>, total: usize) -> Self {
        Self {
            success: true,
            data,
            total,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Control surface: request/response room operations that do not require a
//! live socket. Every operation flows through the same room actor as the
//! socket path, so the serial-execution guarantee holds across both.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use atrium_core::constants::DEFAULT_HISTORY_LIMIT;
use atrium_core::{ParticipantId, RoomError, RoomId, RoomKind, SubmissionId};
use atrium_protocol::{ApiResponse, MessagesResponse};

use crate::server::AppState;

/// Query parameters of `GET .../messages`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Page size (default 50).
    pub limit: Option<usize>,
    /// Messages to skip, counted from the end (default 0).
    pub offset: Option<usize>,
}

/// Body of `POST .../submit`.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    /// Author; must be tracked by the room.
    pub participant_id: String,
    /// Submission content.
    pub content: String,
    /// Optional file reference.
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Body of `POST .../vote`.
#[derive(Debug, Deserialize)]
pub struct VoteBody {
    /// The voter; must be tracked by the room.
    pub participant_id: String,
    /// Target submission.
    pub submission_id: String,
}

/// `GET /rooms/chat/{room_id}/messages?limit&offset`
pub async fn get_messages(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let room = state.rooms.room(RoomKind::Chat, &RoomId::from(room_id));
    match room
        .history(
            query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            query.offset.unwrap_or(0),
        )
        .await
    {
        Ok((messages, total)) => Json(MessagesResponse::new(messages, total)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// `GET /rooms/chat/{room_id}/users`
pub async fn get_users(State(state): State<AppState>, Path(room_id): Path<String>) -> Response {
    let room = state.rooms.room(RoomKind::Chat, &RoomId::from(room_id));
    match room.users().await {
        Ok(users) => Json(ApiResponse::ok(users)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// `GET /rooms/challenge/{room_id}/participants`
pub async fn get_participants(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Response {
    let room = state.rooms.room(RoomKind::Challenge, &RoomId::from(room_id));
    match room.participants().await {
        Ok(participants) => Json(ApiResponse::ok(participants)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// `GET /rooms/challenge/{room_id}/submissions`
pub async fn get_submissions(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Response {
    let room = state.rooms.room(RoomKind::Challenge, &RoomId::from(room_id));
    match room.submissions().await {
        Ok(submissions) => Json(ApiResponse::ok(submissions)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// `GET /rooms/challenge/{room_id}/leaderboard`
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Response {
    let room = state.rooms.room(RoomKind::Challenge, &RoomId::from(room_id));
    match room.leaderboard().await {
        Ok(standings) => Json(ApiResponse::ok(standings)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// `POST /rooms/challenge/{room_id}/submit`
pub async fn post_submit(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(body): Json<SubmitBody>,
) -> Response {
    let room = state.rooms.room(RoomKind::Challenge, &RoomId::from(room_id));
    match room
        .submit(
            ParticipantId::from(body.participant_id),
            body.content,
            body.file_url,
        )
        .await
    {
        Ok(()) => Json(ApiResponse::<()>::accepted()).into_response(),
        Err(err) => error_response(&err),
    }
}

/// `POST /rooms/challenge/{room_id}/vote`
pub async fn post_vote(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(body): Json<VoteBody>,
) -> Response {
    let room = state.rooms.room(RoomKind::Challenge, &RoomId::from(room_id));
    match room
        .vote(
            ParticipantId::from(body.participant_id),
            SubmissionId::from(body.submission_id),
        )
        .await
    {
        Ok(()) => Json(ApiResponse::<()>::accepted()).into_response(),
        Err(err) => error_response(&err),
    }
}

/// `POST /rooms/challenge/{room_id}/end`
pub async fn post_end(State(state): State<AppState>, Path(room_id): Path<String>) -> Response {
    let room = state.rooms.room(RoomKind::Challenge, &RoomId::from(room_id));
    match room.end().await {
        Ok(()) => Json(ApiResponse::<()>::accepted()).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Map a `RoomError` to the status code and `{success:false, error}` body.
pub fn error_response(err: &RoomError) -> Response {
    let status = match err {
        RoomError::NotFound { .. } => StatusCode::NOT_FOUND,
        RoomError::InvalidParams { .. } | RoomError::InvalidOperation { .. } => {
            StatusCode::BAD_REQUEST
        }
        RoomError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        status,
        Json(ApiResponse::<()>::error(err.code(), err.to_string())),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let resp = error_response(&RoomError::not_found("submission", "s1"));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invariant_violation_maps_to_400() {
        let resp = error_response(&RoomError::invalid_operation("already voted"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unavailable_maps_to_503() {
        let resp = error_response(&RoomError::Unavailable);
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

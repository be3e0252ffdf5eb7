//! WebSocket upgrade and per-socket session loop.
//!
//! Identity arrives as query parameters on the upgrade request and is
//! validated before any room state is touched. After the upgrade the socket
//! is split: an outbound task forwards room events and sends periodic Ping
//! frames; the inbound loop hands every text frame to the owning room actor.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use atrium_core::errors::INVALID_PARAMS;
use atrium_core::{ConnectionId, ParticipantId, RoomId, RoomKind};
use atrium_protocol::ApiResponse;
use atrium_rooms::{Identity, RoomHandle, SocketConnection};

use crate::config::ServerConfig;
use crate::server::AppState;

/// Identity query parameters on the upgrade request.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// Required user id.
    pub user_id: Option<String>,
    /// Required display name.
    pub username: Option<String>,
    /// Optional avatar reference.
    pub avatar_url: Option<String>,
}

impl ConnectQuery {
    /// Validate the required parameters.
    ///
    /// Rejection happens here, before the upgrade, so a bad request never
    /// touches room state.
    pub fn into_identity(self) -> Result<Identity, Response> {
        let user_id = self.user_id.filter(|v| !v.is_empty());
        let username = self.username.filter(|v| !v.is_empty());
        match (user_id, username) {
            (Some(user_id), Some(username)) => Ok(Identity {
                user_id: ParticipantId::from(user_id),
                username,
                avatar_url: self.avatar_url.filter(|v| !v.is_empty()),
            }),
            _ => Err((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(
                    INVALID_PARAMS,
                    "user_id and username query parameters are required",
                )),
            )
                .into_response()),
        }
    }
}

/// `GET /rooms/chat/{room_id}/ws`
pub async fn chat_ws(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<ConnectQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    serve_ws(&state, RoomKind::Chat, room_id, query, ws)
}

/// `GET /rooms/challenge/{room_id}/ws`
pub async fn challenge_ws(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<ConnectQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    serve_ws(&state, RoomKind::Challenge, room_id, query, ws)
}

fn serve_ws(
    state: &AppState,
    kind: RoomKind,
    room_id: String,
    query: ConnectQuery,
    ws: WebSocketUpgrade,
) -> Response {
    let identity = match query.into_identity() {
        Ok(identity) => identity,
        Err(rejection) => return rejection,
    };
    let room = state.rooms.room(kind, &RoomId::from(room_id));
    let config = state.config.clone();
    let connections = state.connections.clone();
    ws.on_upgrade(move |socket| run_ws_session(socket, room, identity, config, connections))
}

/// Run a WebSocket session for one admitted socket.
///
/// 1. Registers the connection with the room actor (which sends the
///    room-type snapshot and announces the join)
/// 2. Forwards outbound room events, interleaved with Ping frames
/// 3. Hands every inbound text/binary frame to the room actor
/// 4. Reports the disconnect on close, heartbeat failure, or room loss
#[instrument(skip_all, fields(room_id = %room.room_id(), user_id = %identity.user_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    room: RoomHandle,
    identity: Identity,
    config: ServerConfig,
    connections: Arc<AtomicUsize>,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(config.outbound_buffer);
    let connection_id = ConnectionId::new();
    let connection = Arc::new(SocketConnection::new(
        connection_id.clone(),
        identity.user_id.clone(),
        send_tx,
    ));

    let connection_start = std::time::Instant::now();
    info!(conn_id = %connection_id, "client connected");
    counter!("ws_connections_total").increment(1);
    gauge!("ws_connections_active").increment(1.0);
    let _ = connections.fetch_add(1, Ordering::Relaxed);

    if room.connect(connection.clone(), identity).await.is_err() {
        warn!(conn_id = %connection_id, "room unavailable, closing socket");
        gauge!("ws_connections_active").decrement(1.0);
        let _ = connections.fetch_sub(1, Ordering::Relaxed);
        return;
    }

    // Outbound forwarder with periodic Ping frames
    let ping_interval = Duration::from_millis(config.heartbeat_interval_ms);
    let pong_timeout = Duration::from_millis(config.heartbeat_timeout_ms);
    let outbound_conn = connection.clone();
    let outbound = tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_interval);
        // Skip the immediate first tick
        let _ = ping.tick().await;

        loop {
            tokio::select! {
                event = send_rx.recv() => {
                    match event {
                        Some(json) => {
                            if ws_tx.send(Message::Text((*json).clone().into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping.tick() => {
                    if !outbound_conn.check_alive()
                        && outbound_conn.last_pong_elapsed() > pong_timeout
                    {
                        warn!("client unresponsive for {pong_timeout:?}, disconnecting");
                        break;
                    }
                    if ws_tx.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Inbound loop: every text frame goes to the room actor
    while let Some(Ok(msg)) = ws_rx.next().await {
        let text = match msg {
            Message::Text(ref t) => Some(t.to_string()),
            Message::Binary(ref data) => match std::str::from_utf8(data) {
                Ok(s) => Some(s.to_owned()),
                Err(_) => {
                    info!(len = data.len(), "ignoring non-UTF8 binary frame");
                    None
                }
            },
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {
                connection.mark_alive();
                None
            }
        };
        let Some(text) = text else { continue };

        if room.frame(connection_id.clone(), text).await.is_err() {
            // Room actor is gone (shutdown); nothing more to do here
            break;
        }
    }

    info!(conn_id = %connection_id, "client disconnected");
    counter!("ws_disconnections_total").increment(1);
    gauge!("ws_connections_active").decrement(1.0);
    histogram!("ws_connection_duration_seconds").record(connection_start.elapsed().as_secs_f64());
    let _ = connections.fetch_sub(1, Ordering::Relaxed);
    outbound.abort();
    let _ = room.disconnect(connection_id).await;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn query(user_id: Option<&str>, username: Option<&str>) -> ConnectQuery {
        ConnectQuery {
            user_id: user_id.map(str::to_owned),
            username: username.map(str::to_owned),
            avatar_url: None,
        }
    }

    #[test]
    fn complete_identity_is_accepted() {
        let identity = query(Some("u1"), Some("Ada")).into_identity().unwrap();
        assert_eq!(identity.user_id.as_str(), "u1");
        assert_eq!(identity.username, "Ada");
        assert!(identity.avatar_url.is_none());
    }

    #[test]
    fn missing_user_id_is_rejected() {
        let rejection = query(None, Some("Ada")).into_identity().unwrap_err();
        assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_username_is_rejected() {
        let rejection = query(Some("u1"), None).into_identity().unwrap_err();
        assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_values_count_as_missing() {
        let rejection = query(Some(""), Some("Ada")).into_identity().unwrap_err();
        assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_avatar_url_is_dropped() {
        let mut q = query(Some("u1"), Some("Ada"));
        q.avatar_url = Some(String::new());
        let identity = q.into_identity().unwrap();
        assert!(identity.avatar_url.is_none());
    }
}

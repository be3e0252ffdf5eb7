//! `AtriumServer` — Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use atrium_rooms::RoomRegistry;

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::routes;
use crate::shutdown::ShutdownCoordinator;
use crate::ws;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Room registry (room id → actor handle).
    pub rooms: Arc<RoomRegistry>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Server configuration.
    pub config: ServerConfig,
    /// Open WebSocket connection count.
    pub connections: Arc<AtomicUsize>,
    /// Prometheus render handle, when the recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

/// The main Atrium server.
pub struct AtriumServer {
    config: ServerConfig,
    rooms: Arc<RoomRegistry>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    connections: Arc<AtomicUsize>,
    metrics: Option<PrometheusHandle>,
}

impl AtriumServer {
    /// Create a new server. Room actors stop with the server's shutdown
    /// token.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let shutdown = Arc::new(ShutdownCoordinator::new());
        let rooms = Arc::new(RoomRegistry::with_shutdown(
            config.room_buffer,
            shutdown.token(),
        ));
        Self {
            config,
            rooms,
            shutdown,
            start_time: Instant::now(),
            connections: Arc::new(AtomicUsize::new(0)),
            metrics: None,
        }
    }

    /// Attach an installed Prometheus recorder for `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            rooms: self.rooms.clone(),
            shutdown: self.shutdown.clone(),
            start_time: self.start_time,
            config: self.config.clone(),
            connections: self.connections.clone(),
            metrics: self.metrics.clone(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/rooms/chat/{room_id}/ws", get(ws::chat_ws))
            .route("/rooms/chat/{room_id}/messages", get(routes::get_messages))
            .route("/rooms/chat/{room_id}/users", get(routes::get_users))
            .route("/rooms/challenge/{room_id}/ws", get(ws::challenge_ws))
            .route(
                "/rooms/challenge/{room_id}/participants",
                get(routes::get_participants),
            )
            .route(
                "/rooms/challenge/{room_id}/submissions",
                get(routes::get_submissions),
            )
            .route(
                "/rooms/challenge/{room_id}/leaderboard",
                get(routes::get_leaderboard),
            )
            .route("/rooms/challenge/{room_id}/submit", post(routes::post_submit))
            .route("/rooms/challenge/{room_id}/vote", post(routes::post_vote))
            .route("/rooms/challenge/{room_id}/end", post(routes::post_end))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind and serve; returns the bound address and the serve task.
    ///
    /// The serve task exits when the shutdown token fires.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        info!(%addr, "atrium server listening");

        let app = self.router();
        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
        });
        Ok((addr, handle))
    }

    /// Get the room registry.
    pub fn rooms(&self) -> &Arc<RoomRegistry> {
        &self.rooms
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// `GET /health`
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let resp = health::health_check(
        state.start_time,
        state.connections.load(Ordering::Relaxed),
        state.rooms.len(),
    );
    Json(resp)
}

/// `GET /metrics`
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

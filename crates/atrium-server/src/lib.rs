//! # atrium-server
//!
//! Axum HTTP + `WebSocket` server for the Atrium room coordinator.
//!
//! - `WebSocket` gateway: identity validation on upgrade, per-socket session
//!   loop with heartbeat, frames forwarded to the owning room actor
//! - Control surface: request/response room operations under `/rooms/...`
//! - `/health` and `/metrics` endpoints
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod ws;

pub use config::ServerConfig;
pub use server::{AppState, AtriumServer};
pub use shutdown::ShutdownCoordinator;

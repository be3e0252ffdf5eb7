//! Settings types.

use serde::{Deserialize, Serialize};

/// Top-level Atrium settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AtriumSettings {
    /// Settings schema version.
    pub version: String,
    /// Deployment name.
    pub name: String,
    /// Network and socket settings.
    pub server: ServerSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

impl Default for AtriumSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "atrium".to_string(),
            server: ServerSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Server network and socket settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// HTTP/WebSocket port.
    pub port: u16,
    /// Server-initiated Ping interval in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Close a socket after this long without a Pong, in milliseconds.
    pub heartbeat_timeout_ms: u64,
    /// Per-socket outbound event queue depth.
    pub outbound_buffer: usize,
    /// Per-room command queue depth.
    pub room_buffer: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4070,
            heartbeat_interval_ms: 30_000,
            heartbeat_timeout_ms: 60_000,
            outbound_buffer: 1024,
            room_buffer: 256,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default tracing filter when `RUST_LOG` is unset
    /// (`error|warn|info|debug|trace`).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

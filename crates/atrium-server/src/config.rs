//! Server configuration.

use serde::{Deserialize, Serialize};

use atrium_settings::AtriumSettings;

/// Configuration for the Atrium server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Heartbeat Ping interval in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Close a socket after this long without a Pong, in milliseconds.
    pub heartbeat_timeout_ms: u64,
    /// Per-socket outbound event queue depth.
    pub outbound_buffer: usize,
    /// Per-room command queue depth.
    pub room_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            heartbeat_interval_ms: 30_000,
            heartbeat_timeout_ms: 60_000,
            outbound_buffer: 1024,
            room_buffer: 256,
        }
    }
}

impl ServerConfig {
    /// Build a config from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &AtriumSettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            heartbeat_interval_ms: settings.server.heartbeat_interval_ms,
            heartbeat_timeout_ms: settings.server.heartbeat_timeout_ms,
            outbound_buffer: settings.server.outbound_buffer,
            room_buffer: settings.server.room_buffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_loopback_ephemeral() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 0);
    }

    #[test]
    fn default_heartbeat_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.heartbeat_interval_ms, 30_000);
        assert_eq!(cfg.heartbeat_timeout_ms, 60_000);
    }

    #[test]
    fn from_settings_copies_server_section() {
        let mut settings = AtriumSettings::default();
        settings.server.port = 9999;
        settings.server.host = "0.0.0.0".into();
        let cfg = ServerConfig::from_settings(&settings);
        assert_eq!(cfg.port, 9999);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.outbound_buffer, settings.server.outbound_buffer);
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ServerConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.port, cfg.port);
        assert_eq!(back.room_buffer, cfg.room_buffer);
    }
}

//! # atrium-gateway
//!
//! Atrium coordinator server binary — loads settings, initializes tracing
//! and metrics, and starts the HTTP/WebSocket server.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use atrium_server::config::ServerConfig;
use atrium_server::metrics;
use atrium_server::server::AtriumServer;
use atrium_settings::AtriumSettings;

/// Atrium room coordinator server.
#[derive(Parser, Debug)]
#[command(name = "atrium-gateway", about = "Atrium room coordinator server")]
struct Cli {
    /// Host to bind (overrides settings if specified).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings if specified; 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file (default `~/.atrium/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Disable the Prometheus metrics recorder.
    #[arg(long)]
    no_metrics: bool,
}

/// Resolve the effective server config from settings plus CLI overrides.
fn resolve_config(settings: &AtriumSettings, args: &Cli) -> ServerConfig {
    let mut config = ServerConfig::from_settings(settings);
    if let Some(host) = &args.host {
        config.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the settings level applies.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Load settings early (needed for the log level before tracing init)
    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(atrium_settings::settings_path);
    let settings =
        atrium_settings::load_settings_from_path(&settings_path).unwrap_or_default();

    init_tracing(&settings.logging.level);
    tracing::info!(settings_path = %settings_path.display(), "settings loaded");

    let config = resolve_config(&settings, &args);

    let mut server = AtriumServer::new(config);
    if !args.no_metrics {
        server = server.with_metrics(metrics::install_recorder());
    }

    let (addr, serve_task) = server
        .listen()
        .await
        .context("failed to bind the server socket")?;
    tracing::info!(%addr, "atrium gateway ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received");

    // Stop accepting, then drain room actors and the serve task together
    let mut tasks = server.rooms().drain_tasks();
    tasks.push(serve_task);
    server.shutdown().graceful_shutdown(tasks, None).await;
    tracing::info!("atrium gateway stopped");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_settings_values() {
        let args = Cli::parse_from(["atrium-gateway"]);
        let settings = AtriumSettings::default();
        let config = resolve_config(&settings, &args);
        assert_eq!(config.host, settings.server.host);
        assert_eq!(config.port, settings.server.port);
    }

    #[test]
    fn cli_overrides_win() {
        let args = Cli::parse_from(["atrium-gateway", "--host", "127.0.0.1", "--port", "0"]);
        let settings = AtriumSettings::default();
        let config = resolve_config(&settings, &args);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 0);
    }

    #[test]
    fn settings_file_feeds_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"port": 7777}}"#).unwrap();
        let settings = atrium_settings::load_settings_from_path(&path).unwrap();
        let args = Cli::parse_from(["atrium-gateway"]);
        let config = resolve_config(&settings, &args);
        assert_eq!(config.port, 7777);
    }

    #[tokio::test]
    async fn server_graceful_shutdown() {
        let server = AtriumServer::new(ServerConfig::default());
        let (_, serve_task) = server.listen().await.unwrap();

        let mut tasks = server.rooms().drain_tasks();
        tasks.push(serve_task);
        server
            .shutdown()
            .graceful_shutdown(tasks, Some(std::time::Duration::from_secs(5)))
            .await;
        assert!(server.shutdown().is_shutting_down());
    }
}

//! # atrium-settings
//!
//! Configuration management with layered sources for the Atrium coordinator.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`AtriumSettings::default()`]
//! 2. **User file** — `~/.atrium/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `ATRIUM_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::{AtriumSettings, LoggingSettings, ServerSettings};

use std::sync::OnceLock;

/// Global settings singleton, initialized on first access.
static SETTINGS: OnceLock<AtriumSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.atrium/settings.json` with env var
/// overrides; on failure falls back to compiled defaults. Subsequent calls
/// return the cached value.
pub fn get_settings() -> &'static AtriumSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
pub fn init_settings(settings: AtriumSettings) -> std::result::Result<(), AtriumSettings> {
    SETTINGS.set(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

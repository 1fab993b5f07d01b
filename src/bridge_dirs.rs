//! Centralized filesystem paths for the session bridge.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! # Environment Overrides
//!
//! - `SESSION_BRIDGE_DATA_DIR` overrides [`data_dir`]
//! - `SESSION_BRIDGE_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory.
///
/// Resolves to `dirs::data_dir()/session-bridge/` by default.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("SESSION_BRIDGE_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("session-bridge"))
        .unwrap_or_else(|| PathBuf::from("/tmp/session-bridge-data"))
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/session-bridge/` by default.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("SESSION_BRIDGE_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("session-bridge"))
        .unwrap_or_else(|| PathBuf::from("/tmp/session-bridge-config"))
}

/// Durable state directory (`data_dir()/state/`): cached schedule, its
/// digest, and the last fetch time.
#[must_use]
pub fn state_dir() -> PathBuf {
    data_dir().join("state")
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

//! Configuration for the session bridge.
//!
//! [`SyncConfig`] is an immutable snapshot: the host's settings are read
//! into a fresh value on every change and handed to the orchestrator by
//! value, rather than patched field by field.

use crate::clock::{localize_override, parse_timezone};
use crate::error::{BridgeError, Result};
use schedule_feed::FeedConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest accepted fetch interval (minutes).
pub const MIN_FETCH_INTERVAL_MINUTES: u32 = 1;
/// Largest accepted fetch interval (minutes).
pub const MAX_FETCH_INTERVAL_MINUTES: u32 = 60;

/// Settings keys shared by [`SyncConfig::from_settings`] and the property
/// descriptions shown to the host.
pub mod keys {
    pub const ENABLED: &str = "enabled";
    pub const URL: &str = "url";
    pub const CURRENT_TITLE_TARGET: &str = "current_title_source";
    pub const CURRENT_PRESENTERS_TARGET: &str = "current_presenters_source";
    pub const NEXT_TITLE_TARGET: &str = "next_title_source";
    pub const NEXT_PRESENTERS_TARGET: &str = "next_presenters_source";
    pub const OVERRIDE_DATETIME: &str = "fake_current_datetime";
    pub const TIMEZONE: &str = "local_timezone";
    pub const ROOM_NAME: &str = "room_name";
    pub const FETCH_INTERVAL_MINUTES: &str = "fetch_interval_minutes";

    /// The four display-target keys in write order.
    pub const TARGETS: [&str; 4] = [
        CURRENT_TITLE_TARGET,
        CURRENT_PRESENTERS_TARGET,
        NEXT_TITLE_TARGET,
        NEXT_PRESENTERS_TARGET,
    ];
}

/// Host-side settings object with typed getters.
///
/// Missing keys read as the type's zero value, the way plugin hosts
/// usually behave; [`SyncConfig::from_settings`] fills in defaults.
pub trait Settings {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn get_string(&self, key: &str) -> Option<String>;
    fn get_int(&self, key: &str) -> Option<i64>;
}

/// Settings backed by a JSON object, as delivered by the stdio host bridge.
#[derive(Debug, Clone, Default)]
pub struct JsonSettings(pub serde_json::Map<String, serde_json::Value>);

impl JsonSettings {
    /// Wrap a JSON value; anything other than an object is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if `value` is not a JSON object.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(Self(map)),
            other => Err(BridgeError::Config(format!(
                "settings must be a JSON object, got {other}"
            ))),
        }
    }
}

impl Settings for JsonSettings {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(serde_json::Value::as_bool)
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.0
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(serde_json::Value::as_i64)
    }
}

/// Everything one orchestration cycle needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Master switch; when false a tick does nothing at all.
    pub enabled: bool,
    /// Schedule feed URL.
    pub url: String,
    /// Display target for the current session title.
    pub current_title_target: String,
    /// Display target for the current session presenters.
    pub current_presenters_target: String,
    /// Display target for the next session title.
    pub next_title_target: String,
    /// Display target for the next session presenters.
    pub next_presenters_target: String,
    /// Pin "now" to this local time (`YYYY-MM-DDTHH:MM:SS`).
    pub override_datetime: Option<String>,
    /// IANA timezone the override is interpreted in.
    pub timezone: String,
    /// Room whose sessions are shown. Exact, case-sensitive match.
    pub room_name: String,
    /// Minimum time between fetches, 1 to 60 minutes.
    pub fetch_interval_minutes: u32,
    /// HTTP settings for the feed request.
    pub feed: FeedConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            current_title_target: String::new(),
            current_presenters_target: String::new(),
            next_title_target: String::new(),
            next_presenters_target: String::new(),
            override_datetime: None,
            timezone: "UTC".to_owned(),
            room_name: String::new(),
            fetch_interval_minutes: 5,
            feed: FeedConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Build a config from host settings, using defaults for absent keys.
    ///
    /// A blank override means "use the real clock". The fetch interval is
    /// clamped into `[1, 60]`.
    pub fn from_settings(settings: &dyn Settings) -> Self {
        let defaults = Self::default();
        let string_or = |key: &str, fallback: String| settings.get_string(key).unwrap_or(fallback);

        let interval = settings
            .get_int(keys::FETCH_INTERVAL_MINUTES)
            .unwrap_or(i64::from(defaults.fetch_interval_minutes))
            .clamp(
                i64::from(MIN_FETCH_INTERVAL_MINUTES),
                i64::from(MAX_FETCH_INTERVAL_MINUTES),
            );

        let timezone = settings
            .get_string(keys::TIMEZONE)
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or(defaults.timezone);

        Self {
            enabled: settings.get_bool(keys::ENABLED).unwrap_or(defaults.enabled),
            url: string_or(keys::URL, defaults.url),
            current_title_target: string_or(keys::CURRENT_TITLE_TARGET, String::new()),
            current_presenters_target: string_or(keys::CURRENT_PRESENTERS_TARGET, String::new()),
            next_title_target: string_or(keys::NEXT_TITLE_TARGET, String::new()),
            next_presenters_target: string_or(keys::NEXT_PRESENTERS_TARGET, String::new()),
            override_datetime: settings
                .get_string(keys::OVERRIDE_DATETIME)
                .map(|raw| raw.trim().to_owned())
                .filter(|raw| !raw.is_empty()),
            timezone,
            room_name: string_or(keys::ROOM_NAME, defaults.room_name),
            fetch_interval_minutes: u32::try_from(interval)
                .unwrap_or(defaults.fetch_interval_minutes),
            feed: defaults.feed,
        }
    }

    /// The four target names in write order.
    #[must_use]
    pub fn targets(&self) -> [&str; 4] {
        [
            &self.current_title_target,
            &self.current_presenters_target,
            &self.next_title_target,
            &self.next_presenters_target,
        ]
    }

    /// Fetch interval in seconds.
    #[must_use]
    pub fn fetch_interval_secs(&self) -> i64 {
        i64::from(self.fetch_interval_minutes) * 60
    }

    /// Check the fields that can be wrong independently of the network.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FETCH_INTERVAL_MINUTES..=MAX_FETCH_INTERVAL_MINUTES)
            .contains(&self.fetch_interval_minutes)
        {
            return Err(BridgeError::Config(format!(
                "fetch_interval_minutes must be between {MIN_FETCH_INTERVAL_MINUTES} and \
                 {MAX_FETCH_INTERVAL_MINUTES}, got {}",
                self.fetch_interval_minutes
            )));
        }
        let tz = parse_timezone(&self.timezone)?;
        if let Some(raw) = &self.override_datetime {
            localize_override(raw, tz)?;
        }
        self.feed
            .validate()
            .map_err(|e| BridgeError::Config(e.to_string()))?;
        Ok(())
    }

    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| BridgeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        crate::bridge_dirs::config_file()
    }
}

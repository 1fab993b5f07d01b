//! Feed fetch configuration with sensible defaults.

use crate::error::FeedError;
use serde::{Deserialize, Serialize};

/// Configuration for schedule feed requests.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Upper bound in seconds for connecting and for reading the response.
    /// Must be finite and non-zero so a dead server cannot stall a tick.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, a crate-identifying agent is sent.
    pub user_agent: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: None,
        }
    }
}

impl FeedConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.timeout_seconds == 0 {
            return Err(FeedError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self
            .user_agent
            .as_deref()
            .is_some_and(|ua| ua.trim().is_empty())
        {
            return Err(FeedError::Config("user_agent must not be blank".into()));
        }
        Ok(())
    }

    /// The User-Agent header value to send.
    #[must_use]
    pub fn effective_user_agent(&self) -> String {
        match &self.user_agent {
            Some(custom) => custom.clone(),
            None => concat!("schedule-feed/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

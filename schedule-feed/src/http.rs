//! Shared blocking HTTP agent for feed requests.
//!
//! The agent is configured with finite connect/read/write timeouts so a
//! single fetch can never stall the caller's tick loop indefinitely.

use crate::config::FeedConfig;
use crate::error::FeedError;
use std::time::Duration;
use url::Url;

/// Build a [`ureq::Agent`] configured for schedule feed requests.
///
/// # Errors
///
/// Returns [`FeedError::Config`] if the configuration is invalid.
pub fn build_agent(config: &FeedConfig) -> Result<ureq::Agent, FeedError> {
    config.validate()?;
    let timeout = Duration::from_secs(config.timeout_seconds);
    Ok(ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .timeout_write(timeout)
        .user_agent(&config.effective_user_agent())
        .redirects(5)
        .build())
}

/// Parse and check a feed URL. Only `http` and `https` are accepted.
///
/// # Errors
///
/// Returns [`FeedError::Config`] for blank, unparsable, or non-HTTP URLs.
pub fn validate_url(raw: &str) -> Result<Url, FeedError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FeedError::Config("feed URL is empty".into()));
    }
    let url = Url::parse(trimmed)
        .map_err(|e| FeedError::Config(format!("invalid feed URL {trimmed:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FeedError::Config(format!(
            "unsupported feed URL scheme {other:?}"
        ))),
    }
}

//! Schedule fetcher abstraction and the HTTP implementation.

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::http::{build_agent, validate_url};
use crate::types::ScheduleDocument;

/// A source of schedule documents.
///
/// Implementations perform exactly one read per call; retrying is the
/// caller's business.
pub trait ScheduleFetcher {
    /// Fetch and parse the schedule published at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`FeedError`] on any transport, status, or parse failure.
    fn fetch(&self, url: &str) -> Result<ScheduleDocument, FeedError>;
}

/// Fetches schedules with a single blocking HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher from a feed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Config`] if the configuration is invalid.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        Ok(Self {
            agent: build_agent(config)?,
        })
    }
}

impl ScheduleFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<ScheduleDocument, FeedError> {
        let url = validate_url(url)?;
        tracing::debug!(url = %url, "fetching schedule feed");

        let response = match self
            .agent
            .get(url.as_str())
            .set("Accept", "application/json")
            .call()
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, _)) => return Err(FeedError::Status(code)),
            Err(e) => return Err(FeedError::Http(e.to_string())),
        };

        let body = response
            .into_string()
            .map_err(|e| FeedError::Http(format!("failed to read response body: {e}")))?;

        parse_document(&body)
    }
}

/// Parse a feed body into a [`ScheduleDocument`].
///
/// # Errors
///
/// Returns [`FeedError::Parse`] if the body is not a well-formed schedule.
pub fn parse_document(body: &str) -> Result<ScheduleDocument, FeedError> {
    serde_json::from_str(body).map_err(|e| FeedError::Parse(e.to_string()))
}

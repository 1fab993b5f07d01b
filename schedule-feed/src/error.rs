//! Error types for the schedule-feed crate.
//!
//! Every variant is recoverable from the caller's point of view: a failed
//! fetch leaves the previously cached schedule in place.

/// Errors that can occur while fetching a schedule feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Transport-level failure (DNS, connect, timeout, reset, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status code.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The body was not a schedule document (bad JSON or missing fields).
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid feed configuration or URL.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for schedule-feed results.
pub type Result<T> = std::result::Result<T, FeedError>;

//! Error types for the session bridge.

use schedule_feed::FeedError;

/// Top-level error type for the session bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Fetching the schedule feed failed (transport, status, or bad payload).
    #[error("network error: {0}")]
    Network(#[from] FeedError),

    /// Nothing has been cached yet; at least one successful fetch is needed.
    #[error("not found: {0}")]
    NotFound(String),

    /// Durable state could not be read, written, or decoded.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// The host has no live display target with this name.
    #[error("unknown display target: {0:?}")]
    UnknownTarget(String),

    /// Host bridge protocol error.
    #[error("host error: {0}")]
    Host(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

//! What happened during one tick.

use crate::resolver::ResolvedView;
use serde::Serialize;

/// Result of the fetch phase of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The interval has not elapsed since the last successful fetch.
    NotDue,
    /// Fetched; the feed matched the cached schedule.
    Unchanged,
    /// Fetched; the cached schedule was replaced.
    Updated,
    /// The fetch cycle failed; the previous cache stays in use.
    Failed(String),
}

/// A display target that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    pub target: String,
    pub reason: String,
}

/// Result of pushing a view to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Targets written successfully.
    pub written: usize,
    /// Values skipped because no target name is configured for them.
    pub unassigned: usize,
    /// Targets the host rejected.
    pub failed: Vec<TargetFailure>,
}

/// Report for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TickReport {
    /// Sync is switched off; nothing was fetched, resolved, or written.
    Disabled,
    /// The tick ran.
    Ran {
        fetch: FetchOutcome,
        /// The resolved view, absent if resolution was impossible.
        view: Option<ResolvedView>,
        /// Present whenever `view` is.
        writes: Option<WriteSummary>,
        /// Why resolution was skipped (e.g. nothing cached yet).
        error: Option<String>,
    },
}

impl TickReport {
    /// Returns `true` if any display target was written.
    #[must_use]
    pub fn wrote_anything(&self) -> bool {
        matches!(self, Self::Ran { writes: Some(w), .. } if w.written > 0)
    }
}

//! Periodic sync driver.
//!
//! Each host tick decides whether the fetch interval has elapsed, refreshes
//! the cached schedule if so, resolves the current and next session for the
//! configured room, and pushes the four values to the host's display
//! targets. Ticks never fail: every problem is logged and reported.

pub mod report;
pub mod runner;
pub mod state;

pub use report::{FetchOutcome, TargetFailure, TickReport, WriteSummary};
pub use runner::SyncOrchestrator;
pub use state::FetchState;

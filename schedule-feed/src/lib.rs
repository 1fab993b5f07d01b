//! # schedule-feed
//!
//! Conference schedule data model and a blocking fetcher for the
//! Sessionize "GridSmart" JSON feed.
//!
//! ## Design
//!
//! - One HTTP GET per fetch, bounded by finite timeouts
//! - No retries; callers decide when to try again
//! - Malformed payloads are rejected whole, never partially accepted
//!
//! ## Example
//!
//! ```no_run
//! use schedule_feed::{FeedConfig, HttpFetcher, ScheduleFetcher};
//!
//! # fn example() -> schedule_feed::Result<()> {
//! let fetcher = HttpFetcher::new(&FeedConfig::default())?;
//! let schedule = fetcher.fetch("https://sessionize.com/api/v2/abcd1234/view/GridSmart")?;
//! println!("{} days", schedule.days.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod types;

pub use config::FeedConfig;
pub use error::{FeedError, Result};
pub use fetcher::{parse_document, HttpFetcher, ScheduleFetcher};
pub use types::{Day, Room, ScheduleDocument, Session, Speaker};

//! Session bridge: shows the current and next conference session of one
//! room in a host application's text targets.
//!
//! The schedule comes from a Sessionize "GridSmart" JSON feed:
//! Feed → ContentCache → Resolver → Display targets
//!
//! # Architecture
//!
//! - **Fetching**: a blocking HTTP GET via the `schedule-feed` crate
//! - **Cache**: the last good schedule plus its SHA-256 digest, on disk
//! - **Resolver**: picks the current and next session for a room and instant
//! - **Orchestrator**: one cycle per host tick, gated by a fetch interval
//! - **Host**: display targets, the settings form, and a stdio JSON protocol

pub mod bridge_dirs;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod host;
pub mod orchestrator;
pub mod resolver;
pub mod store;

pub use cache::ContentCache;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{JsonSettings, Settings, SyncConfig};
pub use error::{BridgeError, Result};
pub use orchestrator::{FetchOutcome, SyncOrchestrator, TickReport};
pub use resolver::{ResolvedView, resolve};
pub use store::{FileStore, MemoryStore, StateStore, StoreKey};

//! Wall-clock access and the "now" used for session resolution.
//!
//! Fetch timing always uses the real clock. Resolution uses the same clock
//! unless an override local time is configured, which pins the schedule
//! view to a fixed moment for rehearsals and tests.

use crate::config::SyncConfig;
use crate::error::{BridgeError, Result};
use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Layout of the override time: naive local time, no offset.
pub const OVERRIDE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Source of the current UTC time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Parse an IANA timezone name such as `Europe/Berlin`.
///
/// # Errors
///
/// Returns [`BridgeError::Config`] for unknown names.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| BridgeError::Config(format!("unknown timezone {name:?}")))
}

/// Interpret `raw` (`YYYY-MM-DDTHH:MM:SS`) as local time in `tz` and convert
/// it to UTC.
///
/// During a DST fall-back the earlier of the two instants is used.
///
/// # Errors
///
/// Returns [`BridgeError::Config`] if `raw` is malformed or names a local
/// time skipped by a DST transition.
pub fn localize_override(raw: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), OVERRIDE_FORMAT).map_err(|e| {
        BridgeError::Config(format!(
            "override time {raw:?} must look like 2024-05-10T09:30:00: {e}"
        ))
    })?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(BridgeError::Config(format!(
            "override time {raw:?} does not exist in {tz}"
        ))),
    }
}

/// The instant sessions are resolved against.
///
/// # Errors
///
/// Returns [`BridgeError::Config`] if an override is configured but the
/// timezone or the override itself is invalid.
pub fn resolution_time(config: &SyncConfig, clock: &dyn Clock) -> Result<DateTime<Utc>> {
    match config.override_datetime.as_deref() {
        Some(raw) => localize_override(raw, parse_timezone(&config.timezone)?),
        None => Ok(clock.now()),
    }
}

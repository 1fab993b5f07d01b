//! Persisted fetch timing.

use crate::error::{BridgeError, Result};
use crate::store::{StateStore, StoreKey};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Layout of records written without an offset (taken as UTC).
const NAIVE_RECORD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// When the schedule was last fetched and cached successfully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchState {
    pub last_fetch_at: Option<DateTime<Utc>>,
}

impl FetchState {
    /// Read the state from `store`.
    ///
    /// A missing record means "never fetched". A record that does not parse
    /// is treated the same way (with a warning) so a damaged file triggers a
    /// fetch instead of blocking one.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Store`] if the store itself cannot be read.
    pub fn load(store: &dyn StateStore) -> Result<Self> {
        let Some(bytes) = store.get(StoreKey::LastFetchTime)? else {
            return Ok(Self::default());
        };
        let raw = String::from_utf8_lossy(&bytes);
        match parse_record(&raw) {
            Some(ts) => Ok(Self {
                last_fetch_at: Some(ts),
            }),
            None => {
                tracing::warn!(raw = %raw.trim(), "ignoring unreadable last fetch time");
                Ok(Self::default())
            }
        }
    }

    /// Persist the state. Clearing an existing record is not supported.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Store`] if the store cannot be written.
    pub fn save(&self, store: &dyn StateStore) -> Result<()> {
        let Some(ts) = self.last_fetch_at else {
            return Err(BridgeError::Store(
                "refusing to persist an empty fetch state".to_owned(),
            ));
        };
        let raw = ts.to_rfc3339_opts(SecondsFormat::Secs, true);
        store.put(StoreKey::LastFetchTime, raw.as_bytes())
    }

    /// Returns `true` if a fetch is due at `now` for the given interval.
    ///
    /// A timestamp in the future (the clock was set back) also counts as due.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>, interval_secs: i64) -> bool {
        match self.last_fetch_at {
            None => true,
            Some(last) => {
                let elapsed = now.signed_duration_since(last).num_seconds();
                elapsed < 0 || elapsed >= interval_secs
            }
        }
    }
}

/// Decode a stored fetch time: RFC 3339, or a naive timestamp in UTC.
fn parse_record(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, NAIVE_RECORD_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

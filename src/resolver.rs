//! Current/next session lookup for one room.
//!
//! A single pass over the schedule in document order classifies each
//! session of the matching rooms against `now`:
//!
//! - `start <= now < end` makes it the current session. A later match in
//!   document order replaces an earlier one.
//! - `start > now` makes it the next session, but only if no next session
//!   has been picked yet. The first future session in document order wins,
//!   even when a later entry starts sooner.
//! - Sessions that already ended are ignored.

use chrono::{DateTime, NaiveDateTime, Utc};
use schedule_feed::{ScheduleDocument, Session, Speaker};
use serde::Serialize;

/// Accepted layouts for feed timestamps without an offset.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// The values mirrored into display targets for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedView {
    pub current_title: Option<String>,
    pub current_presenters: Option<String>,
    pub next_title: Option<String>,
    pub next_presenters: Option<String>,
}

impl ResolvedView {
    /// The four values in target order: current title, current presenters,
    /// next title, next presenters.
    #[must_use]
    pub fn fields(&self) -> [Option<&str>; 4] {
        [
            self.current_title.as_deref(),
            self.current_presenters.as_deref(),
            self.next_title.as_deref(),
            self.next_presenters.as_deref(),
        ]
    }

    fn set_current(&mut self, session: &Session) {
        self.current_title = Some(session.title.clone());
        self.current_presenters = Some(join_presenters(&session.speakers));
    }

    fn set_next(&mut self, session: &Session) {
        self.next_title = Some(session.title.clone());
        self.next_presenters = Some(join_presenters(&session.speakers));
    }
}

/// Resolve the current and next session of `room_name` at `now`.
///
/// Pure: the result depends only on the arguments.
#[must_use]
pub fn resolve(document: &ScheduleDocument, room_name: &str, now: DateTime<Utc>) -> ResolvedView {
    let mut view = ResolvedView::default();

    for room in document.rooms_named(room_name) {
        for session in &room.sessions {
            let Some((start, end)) = session_window(session) else {
                tracing::debug!(
                    title = %session.title,
                    starts_at = %session.starts_at,
                    ends_at = %session.ends_at,
                    "skipping session with unparsable times"
                );
                continue;
            };

            if start <= now && now < end {
                view.set_current(session);
            } else if start > now && view.next_title.is_none() {
                view.set_next(session);
            }
        }
    }

    view
}

/// Comma-and-space joined speaker names, original order, duplicates kept.
#[must_use]
pub fn join_presenters(speakers: &[Speaker]) -> String {
    speakers
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a feed timestamp into UTC.
///
/// Timestamps carrying an offset are converted; naive timestamps are taken
/// to be UTC already.
#[must_use]
pub fn parse_session_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn session_window(session: &Session) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    Some((
        parse_session_time(&session.starts_at)?,
        parse_session_time(&session.ends_at)?,
    ))
}

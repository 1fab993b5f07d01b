//! Schedule data model for the Sessionize "GridSmart" JSON feed.
//!
//! The feed is an array of days, each day lists its rooms, and each room
//! lists its sessions in display order. Only the fields the bridge needs
//! are modelled; unknown fields are ignored on input.

use serde::{Deserialize, Serialize};

/// A full conference schedule as returned by the feed.
///
/// Replaced wholesale on every successful fetch, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleDocument {
    pub days: Vec<Day>,
}

impl ScheduleDocument {
    /// Wrap an ordered list of days.
    #[must_use]
    pub fn new(days: Vec<Day>) -> Self {
        Self { days }
    }

    /// Returns `true` if the schedule has no days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Iterate over every room named `room_name` across all days, in
    /// document order. Matching is exact and case-sensitive.
    pub fn rooms_named<'a>(&'a self, room_name: &'a str) -> impl Iterator<Item = &'a Room> + 'a {
        self.days
            .iter()
            .flat_map(|day| day.rooms.iter())
            .filter(move |room| room.name == room_name)
    }

    /// Distinct room names in first-seen order (used for configuration hints).
    #[must_use]
    pub fn room_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for room in self.days.iter().flat_map(|day| day.rooms.iter()) {
            if !names.iter().any(|n| n == &room.name) {
                names.push(room.name.clone());
            }
        }
        names
    }
}

/// One conference day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    /// Calendar date as sent by the feed (e.g. `2024-05-10T00:00:00`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub rooms: Vec<Room>,
}

/// A room and its sessions for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub sessions: Vec<Session>,
}

/// A scheduled session.
///
/// Times are kept as the feed's strings; the resolver parses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub title: String,
    pub starts_at: String,
    pub ends_at: String,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
}

/// A presenter attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
}

impl Speaker {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

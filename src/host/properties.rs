//! Configuration UI description for the host.
//!
//! The host renders these descriptors as its settings form. The list of
//! display targets is read from the live host each time, so newly added
//! targets show up in the dropdowns. Nothing in the sync path reads this.

use crate::config::{MAX_FETCH_INTERVAL_MINUTES, MIN_FETCH_INTERVAL_MINUTES, keys};
use crate::host::display::DisplayHost;
use serde::Serialize;

/// The kind of form control a property needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyKind {
    Bool,
    Text,
    Int { min: i64, max: i64, step: i64 },
    List { options: Vec<String> },
}

/// One editable setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    /// Settings key the value is stored under.
    pub key: &'static str,
    /// Human-readable label.
    pub label: String,
    #[serde(flatten)]
    pub kind: PropertyKind,
}

impl PropertyDescriptor {
    fn new(key: &'static str, label: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            key,
            label: label.into(),
            kind,
        }
    }
}

/// Human label for a settings key: `current_title_source` becomes
/// `Current Title Source Field`.
fn target_label(key: &str) -> String {
    let words: Vec<String> = key
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    format!("{} Field", words.join(" "))
}

/// All IANA timezone names known to the build.
#[must_use]
pub fn timezone_names() -> Vec<String> {
    chrono_tz::TZ_VARIANTS
        .iter()
        .map(|tz| tz.name().to_owned())
        .collect()
}

/// Build the settings form for `host`.
#[must_use]
pub fn properties(host: &dyn DisplayHost) -> Vec<PropertyDescriptor> {
    let targets = host.target_names();

    let mut props = vec![PropertyDescriptor::new(
        keys::ENABLED,
        "Enabled",
        PropertyKind::Bool,
    )];

    props.extend(keys::TARGETS.into_iter().map(|key| {
        PropertyDescriptor::new(
            key,
            target_label(key),
            PropertyKind::List {
                options: targets.clone(),
            },
        )
    }));

    props.push(PropertyDescriptor::new(
        keys::FETCH_INTERVAL_MINUTES,
        "Fetch Interval (minutes)",
        PropertyKind::Int {
            min: i64::from(MIN_FETCH_INTERVAL_MINUTES),
            max: i64::from(MAX_FETCH_INTERVAL_MINUTES),
            step: 1,
        },
    ));
    props.push(PropertyDescriptor::new(
        keys::TIMEZONE,
        "Local Timezone",
        PropertyKind::List {
            options: timezone_names(),
        },
    ));
    props.push(PropertyDescriptor::new(keys::URL, "URL", PropertyKind::Text));
    props.push(PropertyDescriptor::new(
        keys::OVERRIDE_DATETIME,
        "Fake Current LOCAL DateTime (format: YYYY-MM-DDTHH:MM:SS)",
        PropertyKind::Text,
    ));
    props.push(PropertyDescriptor::new(
        keys::ROOM_NAME,
        "Room Name",
        PropertyKind::Text,
    ));

    props
}

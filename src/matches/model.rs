//! Canonical match types shared by commands, alerts and rendering.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Team name used when no upstream spelling resolves to a non-empty string.
pub const UNKNOWN_TEAM: &str = "?";

/// A segment exactly as the upstream API delivered it.
///
/// The API is unofficial and its segment shape drifts between versions, so
/// nothing about the contents is assumed beyond "is it an object or not".
#[derive(Debug, Clone, PartialEq)]
pub enum RawMatchRecord {
    /// A JSON object; fields may still be absent, null, nested or flat.
    Record(Map<String, Value>),
    /// Anything else (string placeholders, nulls, arrays, numbers).
    Unknown(Value),
}

impl RawMatchRecord {
    /// Returns the object fields when the record is object-shaped.
    #[must_use]
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Record(fields) => Some(fields),
            Self::Unknown(_) => None,
        }
    }
}

impl From<Value> for RawMatchRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::Record(fields),
            other => Self::Unknown(other),
        }
    }
}

/// Score attached to a match.
///
/// Either a synthesized/explicit score line (`"2-1"`) or the upstream list of
/// per-map results passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchScore {
    Line(String),
    Maps(Vec<Value>),
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => f.write_str(line),
            Self::Maps(maps) => {
                let rendered = serde_json::to_string(maps).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

/// A match in the one shape the rest of the bot understands.
///
/// Serializes back into a record that [`normalize`](super::normalize) maps
/// onto an identical value, so normalized output can be fed through again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMatch {
    pub team1: String,
    pub team2: String,
    pub event: String,
    pub region: String,
    pub status: String,
    /// Match page; may be empty.
    pub url: String,
    /// Upstream identifier; empty means "no stable identity".
    pub match_id: String,
    /// Scheduled start in epoch seconds; `None` when unknown.
    pub time_unix: Option<i64>,
    pub score: Option<MatchScore>,
    pub live: bool,
}

impl NormalizedMatch {
    /// Identifier usable for alert dedup, if the upstream supplied one.
    #[must_use]
    pub fn stable_id(&self) -> Option<&str> {
        if self.match_id.is_empty() {
            None
        } else {
            Some(&self.match_id)
        }
    }

    /// Seconds until the scheduled start, or `None` when the start is unknown
    /// or too far from `now` to represent.
    #[must_use]
    pub fn seconds_until_start(&self, now: i64) -> Option<i64> {
        self.time_unix.and_then(|start| start.checked_sub(now))
    }

    /// Card title: `"{team1} vs {team2}"`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} vs {}", self.team1, self.team2)
    }
}

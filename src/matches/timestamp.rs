//! Start-time coercion for upstream segments.
//!
//! Upstream timestamps arrive as integer epoch seconds or as naive
//! `YYYY-MM-DD HH:MM:SS` strings with no zone. Both are treated as UTC.

use chrono::NaiveDateTime;
use serde_json::Value;

/// Format of the string timestamps the upstream emits.
pub const UPSTREAM_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Coerces a JSON value into epoch seconds.
///
/// Integers pass through, formatted strings are parsed, everything else
/// (floats, other string formats, objects, null) yields `None`. Zero is the
/// upstream's "unknown" marker and also yields `None`.
#[must_use]
pub fn coerce_epoch_seconds(value: &Value) -> Option<i64> {
    let seconds = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => parse_naive_utc(text),
        _ => None,
    }?;
    (seconds != 0).then_some(seconds)
}

/// Parses `YYYY-MM-DD HH:MM:SS` as a UTC wall-clock time.
#[must_use]
pub fn parse_naive_utc(text: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(text.trim(), UPSTREAM_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc().timestamp())
}

//! Upstream segment normalization.
//!
//! Every segment goes through two tiers. The strict tier deserializes the
//! shape the API usually sends into [`StrictSegment`]; if serde rejects the
//! segment for any reason the permissive tier walks the raw object and
//! resolves each attribute on its own, defaulting whatever it cannot read.
//! Only non-object input is dropped.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use super::model::{MatchScore, NormalizedMatch, RawMatchRecord, UNKNOWN_TEAM};
use super::timestamp::{coerce_epoch_seconds, parse_naive_utc};

/// Match page prefix used when the upstream sends an id but no link.
pub const MATCH_PAGE_BASE: &str = "https://www.vlr.gg";

const TEAM1_KEYS: &[&[&str]] = &[&["team1"], &["team1", "name"], &["team_1"]];
const TEAM2_KEYS: &[&[&str]] = &[&["team2"], &["team2", "name"], &["team_2"]];
const EVENT_KEYS: &[&[&str]] = &[&["tournament", "name"], &["event"], &["match_event"]];
const REGION_KEYS: &[&[&str]] = &[&["tournament", "region"], &["region"]];
const URL_KEYS: &[&[&str]] = &[&["url"], &["match_page"]];
const ID_KEYS: &[&str] = &["match_id", "id"];
const EPOCH_KEYS: &[&str] = &["time_unix", "unix_time"];

/// Normalizes one upstream record.
///
/// Returns `None` only when the record is not object-shaped. `live_hint`,
/// when given, replaces whatever liveness the payload carried.
#[must_use]
pub fn normalize(raw: &RawMatchRecord, live_hint: Option<bool>) -> Option<NormalizedMatch> {
    let fields = raw.fields()?;
    let mut normalized = match serde_json::from_value::<StrictSegment>(Value::Object(fields.clone()))
    {
        Ok(segment) => segment.into_normalized(),
        Err(_) => permissive(fields),
    };
    if let Some(live) = live_hint {
        normalized.live = live;
    }
    Some(normalized)
}

/// Normalizes a batch of segments, dropping (and logging) non-object entries.
#[instrument(skip(segments), fields(count = segments.len()))]
pub fn normalize_all(segments: Vec<Value>, live_hint: Option<bool>) -> Vec<NormalizedMatch> {
    let mut normalized = Vec::with_capacity(segments.len());
    for segment in segments {
        let raw = RawMatchRecord::from(segment);
        match normalize(&raw, live_hint) {
            Some(m) => normalized.push(m),
            None => info!(segment = ?raw, "Skipping non-record segment"),
        }
    }
    debug!(kept = normalized.len(), "Segments normalized");
    normalized
}

// ==================== Strict tier ====================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StrictTeam {
    Flat(String),
    Nested { name: Option<String> },
}

impl StrictTeam {
    fn into_name(self) -> Option<String> {
        match self {
            Self::Flat(name) => Some(name),
            Self::Nested { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StrictTournament {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    region: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StrictId {
    Text(String),
    Number(u64),
}

/// The segment layout the API sends when it behaves.
#[derive(Debug, Deserialize)]
struct StrictSegment {
    team1: StrictTeam,
    team2: StrictTeam,
    #[serde(default)]
    team_1: Option<String>,
    #[serde(default)]
    team_2: Option<String>,
    #[serde(default)]
    tournament: Option<StrictTournament>,
    #[serde(default, alias = "match_event")]
    event: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "unix_time")]
    time_unix: Option<i64>,
    #[serde(default)]
    unix_timestamp: Option<String>,
    #[serde(default, alias = "id")]
    match_id: Option<StrictId>,
    #[serde(default, alias = "match_page")]
    url: Option<String>,
    #[serde(default)]
    score1: Option<Value>,
    #[serde(default)]
    score2: Option<Value>,
    #[serde(default)]
    score: Option<MatchScore>,
    #[serde(default)]
    maps: Option<Vec<Value>>,
    #[serde(default)]
    live: Option<bool>,
}

impl StrictSegment {
    fn into_normalized(self) -> NormalizedMatch {
        let (tournament_name, tournament_region) = match self.tournament {
            Some(t) => (t.name, t.region),
            None => (None, None),
        };
        let match_id = match self.match_id {
            Some(StrictId::Text(id)) => id,
            Some(StrictId::Number(id)) => id.to_string(),
            None => String::new(),
        };
        let time_unix = self
            .time_unix
            .filter(|seconds| *seconds != 0)
            .or_else(|| self.unix_timestamp.as_deref().and_then(parse_naive_utc))
            .filter(|seconds| *seconds != 0);
        let score = compose_score_line(self.score1.as_ref(), self.score2.as_ref())
            .or_else(|| self.score.and_then(non_empty_score))
            .or_else(|| self.maps.map(MatchScore::Maps).and_then(non_empty_score));

        NormalizedMatch {
            team1: team_or_unknown(first_present([self.team1.into_name(), self.team_1])),
            team2: team_or_unknown(first_present([self.team2.into_name(), self.team_2])),
            event: first_non_empty([tournament_name, self.event]),
            region: first_non_empty([tournament_region, self.region]),
            status: self.status.unwrap_or_default(),
            url: url_or_synthesized(self.url, &match_id),
            match_id,
            time_unix,
            score,
            live: self.live.unwrap_or(false),
        }
    }
}

// ==================== Permissive tier ====================

fn permissive(fields: &Map<String, Value>) -> NormalizedMatch {
    let match_id = ID_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(id_text))
        .unwrap_or_default();
    let time_unix = EPOCH_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(coerce_epoch_seconds))
        .or_else(|| fields.get("unix_timestamp").and_then(coerce_epoch_seconds));
    let score = compose_score_line(fields.get("score1"), fields.get("score2"))
        .or_else(|| fields.get("score").and_then(passthrough_score))
        .or_else(|| fields.get("maps").and_then(passthrough_score));

    NormalizedMatch {
        team1: team_or_unknown(first_text(fields, TEAM1_KEYS)),
        team2: team_or_unknown(first_text(fields, TEAM2_KEYS)),
        event: first_text(fields, EVENT_KEYS).unwrap_or_default(),
        region: first_text(fields, REGION_KEYS).unwrap_or_default(),
        status: first_text(fields, &[&["status"]]).unwrap_or_default(),
        url: url_or_synthesized(first_text(fields, URL_KEYS), &match_id),
        match_id,
        time_unix,
        score,
        live: fields.get("live").and_then(Value::as_bool).unwrap_or(false),
    }
}

fn lookup<'a>(fields: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(fields.get(*first)?, |value, key| value.as_object()?.get(*key))
}

fn first_text(fields: &Map<String, Value>, candidates: &[&[&str]]) -> Option<String> {
    candidates.iter().find_map(|path| {
        lookup(fields, path)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) if id.is_i64() || id.is_u64() => Some(id.to_string()),
        _ => None,
    }
}

fn passthrough_score(value: &Value) -> Option<MatchScore> {
    let score = match value {
        Value::String(line) => MatchScore::Line(line.clone()),
        Value::Number(number) => MatchScore::Line(number.to_string()),
        Value::Array(maps) => MatchScore::Maps(maps.clone()),
        _ => return None,
    };
    non_empty_score(score)
}

// ==================== Shared resolution ====================

fn score_part(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed.parse::<i64>().ok().map(|_| trimmed.to_string())
        }
        _ => None,
    }
}

fn compose_score_line(score1: Option<&Value>, score2: Option<&Value>) -> Option<MatchScore> {
    let left = score_part(score1?)?;
    let right = score_part(score2?)?;
    Some(MatchScore::Line(format!("{left}-{right}")))
}

fn non_empty_score(score: MatchScore) -> Option<MatchScore> {
    match &score {
        MatchScore::Line(line) if line.is_empty() => None,
        MatchScore::Maps(maps) if maps.is_empty() => None,
        _ => Some(score),
    }
}

fn team_or_unknown(name: Option<String>) -> String {
    name.filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_TEAM.to_string())
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|text| !text.is_empty())
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> String {
    first_present(candidates).unwrap_or_default()
}

fn url_or_synthesized(url: Option<String>, match_id: &str) -> String {
    match url.filter(|url| !url.is_empty()) {
        Some(url) => url,
        None if !match_id.is_empty() => format!("{MATCH_PAGE_BASE}/{match_id}"),
        None => String::new(),
    }
}

//! Keyword search and ordering over normalized matches.

use super::model::NormalizedMatch;

/// Returns the matches whose team1, team2, event or region contains `needle`,
/// ignoring case.
///
/// Each field is checked on its own (a needle spanning two fields does not
/// match). Input order is kept and an empty needle keeps everything.
#[must_use]
pub fn filter_matches(matches: &[NormalizedMatch], needle: &str) -> Vec<NormalizedMatch> {
    let needle = needle.to_lowercase();
    matches
        .iter()
        .filter(|m| matches_keyword(m, &needle))
        .cloned()
        .collect()
}

fn matches_keyword(m: &NormalizedMatch, lowered_needle: &str) -> bool {
    [&m.team1, &m.team2, &m.event, &m.region]
        .iter()
        .any(|field| field.to_lowercase().contains(lowered_needle))
}

/// Sorts soonest-first; unknown start times sort as epoch zero.
pub fn sort_by_start(matches: &mut [NormalizedMatch]) {
    matches.sort_by_key(|m| m.time_unix.unwrap_or(0));
}

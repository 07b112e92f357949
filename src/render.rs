//! Platform-neutral match cards.
//!
//! A [`MatchCard`] carries everything an embed needs; the Discord adapter
//! turns it into a serenity `CreateEmbed`.

use crate::matches::NormalizedMatch;

/// Accent for live matches (Discord blurple).
pub const LIVE_COLOR: u32 = 0x5865F2;

/// Accent for upcoming matches.
pub const UPCOMING_COLOR: u32 = 0x2ECC71;

/// Attribution shown under every card.
pub const FOOTER_TEXT: &str = "Data via vlrggapi (unofficial)";

/// A name/value pair rendered below the card body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A titled card describing one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCard {
    pub title: String,
    /// Event/region line plus match-page link; `None` when there is nothing to show.
    pub description: Option<String>,
    pub color: u32,
    pub field: Option<CardField>,
    pub footer: String,
}

/// Formats seconds-until-start as `"{h}h {m}m"`, `"{m}m"` or `"now"`.
#[must_use]
pub fn format_countdown(seconds: i64) -> String {
    if seconds <= 0 {
        return "now".to_string();
    }
    let minutes = seconds / 60;
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Renders one match.
///
/// `live` picks the styling: live cards show the score (when there is one),
/// everything else shows a countdown to `time_unix` relative to `now`.
#[must_use]
pub fn render_match_card(m: &NormalizedMatch, live: bool, now: i64) -> MatchCard {
    let mut parts = Vec::new();
    if !m.event.is_empty() {
        parts.push(format!("**Event:** {}", m.event));
    }
    if !m.region.is_empty() {
        parts.push(format!("**Region:** {}", m.region));
    }
    let mut description = parts.join(" · ");
    if !m.url.is_empty() {
        if !description.is_empty() {
            description.push('\n');
        }
        description.push_str(&format!("[Match page]({})", m.url));
    }

    let score_field = m.score.as_ref().filter(|_| live).map(|score| CardField {
        name: "Score".to_string(),
        value: format!("`{score}`"),
        inline: false,
    });
    let field = score_field.or_else(|| {
        m.seconds_until_start(now).map(|seconds| CardField {
            name: "Starts In".to_string(),
            value: format_countdown(seconds),
            inline: true,
        })
    });

    MatchCard {
        title: m.title(),
        description: (!description.is_empty()).then_some(description),
        color: if live { LIVE_COLOR } else { UPCOMING_COLOR },
        field,
        footer: FOOTER_TEXT.to_string(),
    }
}

/// Renders a list, styling each card by its own `live` flag.
#[must_use]
pub fn render_cards(matches: &[NormalizedMatch], now: i64) -> Vec<MatchCard> {
    matches
        .iter()
        .map(|m| render_match_card(m, m.live, now))
        .collect()
}

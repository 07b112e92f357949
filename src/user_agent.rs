//! Shared User-Agent string for upstream API traffic.

/// Project URL advertised in the User-Agent.
const PROJECT_UA_URL: &str = "https://github.com/fierce/valopro";

/// Default User-Agent for match API requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("valopro/{version} (discord-match-bot; +{PROJECT_UA_URL})")
}

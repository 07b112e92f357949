//! Result building for each command.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::api::MatchFeed;
use crate::clock::unix_now;
use crate::interaction::{
    DeliveryOutcome, InteractionTransport, Reply, acknowledge_then_resolve,
};
use crate::matches::{NormalizedMatch, filter_matches, normalize_all, sort_by_start};
use crate::render::{render_cards, render_match_card};

use super::{
    CommandError, CommandInvocation, CommandRequest, MAX_CARDS, WILDCARD_QUERIES,
};

/// Budget for the two fetches behind `/find`.
pub const FIND_TIMEOUT: Duration = Duration::from_secs(12);

/// Reply when `/find` runs out of time.
pub const TIMEOUT_TEXT: &str = "⚠️ Timed out fetching data from VLR. Try again later.";

/// Builds command replies from the match feed.
///
/// Holds no per-request state; one instance serves every invocation.
pub struct MatchService {
    feed: Arc<dyn MatchFeed>,
    find_timeout: Duration,
}

impl MatchService {
    /// Creates a service using the default `/find` timeout.
    #[must_use]
    pub fn new(feed: Arc<dyn MatchFeed>) -> Self {
        Self {
            feed,
            find_timeout: FIND_TIMEOUT,
        }
    }

    /// Overrides the `/find` timeout.
    #[must_use]
    pub fn with_find_timeout(mut self, find_timeout: Duration) -> Self {
        self.find_timeout = find_timeout;
        self
    }

    /// Computes the final reply for a parsed request.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Fetch`] when the feed fails (other than the
    /// `/find` timeout, which is answered with [`TIMEOUT_TEXT`]).
    pub async fn reply_for(&self, request: &CommandRequest, now: i64) -> Result<Reply, CommandError> {
        match request {
            CommandRequest::Upcoming { count, filter } => {
                self.upcoming_reply(*count, filter.as_deref(), now).await
            }
            CommandRequest::Live => self.live_reply(now).await,
            CommandRequest::Find { query } => self.find_reply(query, now).await,
            CommandRequest::Ping => Ok(Reply::text("pong")),
        }
    }

    /// `/next` and `/upcoming`: soonest-first, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Fetch`] when the upcoming feed fails.
    #[instrument(skip(self))]
    pub async fn upcoming_reply(
        &self,
        count: usize,
        filter: Option<&str>,
        now: i64,
    ) -> Result<Reply, CommandError> {
        let mut matches = normalize_all(self.feed.upcoming().await?, Some(false));
        if let Some(needle) = filter {
            matches = filter_matches(&matches, needle);
        }
        sort_by_start(&mut matches);
        matches.truncate(count.clamp(1, MAX_CARDS));

        if matches.is_empty() {
            let text = if filter.is_some() {
                "No upcoming matches found with that filter."
            } else {
                "No upcoming matches found."
            };
            return Ok(Reply::text(text));
        }

        Ok(Reply::with_cards(
            format!("Showing {} upcoming:", matches.len()),
            upcoming_cards(&matches, now),
        ))
    }

    /// `/live`: up to ten live matches with scores.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Fetch`] when the live feed fails.
    #[instrument(skip(self))]
    pub async fn live_reply(&self, now: i64) -> Result<Reply, CommandError> {
        let mut matches = normalize_all(self.feed.live().await?, Some(true));
        if matches.is_empty() {
            return Ok(Reply::text("No live matches right now."));
        }
        matches.truncate(MAX_CARDS);
        Ok(Reply::with_cards(
            format!("Live matches ({} shown):", matches.len()),
            render_cards(&matches, now),
        ))
    }

    /// `/find`: keyword search over live and upcoming, or the upcoming list
    /// for `all` / `*`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Fetch`] when either feed fails.
    #[instrument(skip(self))]
    pub async fn find_reply(&self, query: &str, now: i64) -> Result<Reply, CommandError> {
        let fetched = tokio::time::timeout(self.find_timeout, async {
            tokio::try_join!(self.feed.live(), self.feed.upcoming())
        })
        .await;

        let (live_raw, upcoming_raw) = match fetched {
            Ok(Ok(both)) => both,
            Ok(Err(e)) if e.is_timeout() => {
                warn!(error = %e, "Match API timed out during /find");
                return Ok(Reply::text(TIMEOUT_TEXT));
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!(timeout_secs = self.find_timeout.as_secs(), "/find fetch budget exceeded");
                return Ok(Reply::text(TIMEOUT_TEXT));
            }
        };

        let live = normalize_all(live_raw, Some(true));
        let mut upcoming = normalize_all(upcoming_raw, Some(false));

        if is_wildcard(query) {
            sort_by_start(&mut upcoming);
            upcoming.truncate(MAX_CARDS);
            if upcoming.is_empty() {
                return Ok(Reply::text("No upcoming matches found."));
            }
            return Ok(Reply::with_cards(
                format!("Showing next {} upcoming:", upcoming.len()),
                upcoming_cards(&upcoming, now),
            ));
        }

        let mut everything = live;
        everything.extend(upcoming);
        let mut hits = filter_matches(&everything, query);
        sort_by_start(&mut hits);
        hits.truncate(MAX_CARDS);

        if hits.is_empty() {
            return Ok(Reply::text(format!("No matches found for `{query}`.")));
        }
        Ok(Reply::with_cards(
            format!("Results for `{query}` ({} found):", hits.len()),
            render_cards(&hits, now),
        ))
    }
}

impl std::fmt::Debug for MatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchService")
            .field("find_timeout", &self.find_timeout)
            .finish_non_exhaustive()
    }
}

fn upcoming_cards(matches: &[NormalizedMatch], now: i64) -> Vec<crate::render::MatchCard> {
    matches
        .iter()
        .map(|m| render_match_card(m, false, now))
        .collect()
}

fn is_wildcard(query: &str) -> bool {
    let query = query.trim().to_lowercase();
    WILDCARD_QUERIES.contains(&query.as_str())
}

/// Answers one invocation end to end.
///
/// `/ping` is answered directly in the initial response. Everything else is
/// acknowledged first and resolved with the computed reply; parse errors,
/// fetch errors and panics all end up as an `Error: ...` reply.
#[instrument(skip(service, transport), fields(command = %invocation.name))]
pub async fn dispatch<T>(
    service: &MatchService,
    transport: &T,
    invocation: &CommandInvocation,
) -> DeliveryOutcome
where
    T: InteractionTransport + ?Sized,
{
    let request = match CommandRequest::parse(invocation) {
        Ok(request) => request,
        Err(e) => {
            return acknowledge_then_resolve(transport, "Working…", async move {
                Err::<Reply, _>(e)
            })
            .await;
        }
    };

    let Some(provisional) = request.provisional_text() else {
        return match transport.acknowledge("pong", false).await {
            Ok(()) => DeliveryOutcome::Immediate,
            Err(e) => {
                warn!(error = %e, "Ping response failed");
                DeliveryOutcome::Lost
            }
        };
    };

    let outcome = acknowledge_then_resolve(
        transport,
        &provisional,
        service.reply_for(&request, unix_now()),
    )
    .await;
    info!(?outcome, "Command answered");
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct StaticFeed {
        live: Vec<Value>,
        upcoming: Vec<Value>,
    }

    #[async_trait]
    impl MatchFeed for StaticFeed {
        async fn upcoming(&self) -> Result<Vec<Value>, ApiError> {
            Ok(self.upcoming.clone())
        }

        async fn live(&self) -> Result<Vec<Value>, ApiError> {
            Ok(self.live.clone())
        }
    }

    fn service(live: Vec<Value>, upcoming: Vec<Value>) -> MatchService {
        MatchService::new(Arc::new(StaticFeed { live, upcoming }))
    }

    fn upcoming_fixture() -> Vec<Value> {
        vec![
            json!({"team1": "Fnatic", "team2": "NAVI", "match_event": "Masters", "time_unix": 3000}),
            json!("placeholder"),
            json!({"team1": "LOUD", "team2": "MIBR", "match_event": "Americas", "time_unix": 1000}),
            json!({"team1": "DRX", "team2": "T1", "match_event": "Pacific", "time_unix": 2000}),
        ]
    }

    #[tokio::test]
    async fn test_upcoming_sorted_and_limited() {
        let reply = service(vec![], upcoming_fixture())
            .upcoming_reply(2, None, 0)
            .await
            .unwrap();
        assert_eq!(reply.content.as_deref(), Some("Showing 2 upcoming:"));
        let titles: Vec<&str> = reply.cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["LOUD vs MIBR", "DRX vs T1"]);
    }

    #[tokio::test]
    async fn test_upcoming_filter_without_hits() {
        let reply = service(vec![], upcoming_fixture())
            .upcoming_reply(5, Some("zeta"), 0)
            .await
            .unwrap();
        assert_eq!(
            reply,
            Reply::text("No upcoming matches found with that filter.")
        );
    }

    #[tokio::test]
    async fn test_live_reply_caps_at_ten_and_shows_scores() {
        let live: Vec<Value> = (0..12)
            .map(|i| json!({"team1": format!("T{i}"), "team2": "X", "score1": "1", "score2": "0"}))
            .collect();
        let reply = service(live, vec![]).live_reply(0).await.unwrap();
        assert_eq!(reply.content.as_deref(), Some("Live matches (10 shown):"));
        assert_eq!(reply.cards.len(), 10);
        assert_eq!(reply.cards[0].field.as_ref().unwrap().value, "`1-0`");
    }

    #[tokio::test]
    async fn test_live_empty() {
        let reply = service(vec![json!(null)], vec![]).live_reply(0).await.unwrap();
        assert_eq!(reply, Reply::text("No live matches right now."));
    }

    #[tokio::test]
    async fn test_find_wildcard_lists_upcoming_only() {
        let live = vec![json!({"team1": "Live Team", "team2": "Other", "time_unix": 1})];
        for query in ["*", "all", " ALL "] {
            let reply = service(live.clone(), upcoming_fixture())
                .find_reply(query, 0)
                .await
                .unwrap();
            assert_eq!(reply.content.as_deref(), Some("Showing next 3 upcoming:"));
            let titles: Vec<&str> = reply.cards.iter().map(|c| c.title.as_str()).collect();
            assert_eq!(titles, vec!["LOUD vs MIBR", "DRX vs T1", "Fnatic vs NAVI"]);
        }
    }

    #[tokio::test]
    async fn test_find_searches_live_and_upcoming() {
        let live = vec![json!({"team1": "LOUD", "team2": "Sentinels", "time_unix": 500})];
        let reply = service(live, upcoming_fixture())
            .find_reply("loud", 0)
            .await
            .unwrap();
        assert_eq!(reply.content.as_deref(), Some("Results for `loud` (2 found):"));
        assert_eq!(reply.cards[0].title, "LOUD vs Sentinels");
        assert_eq!(reply.cards[0].color, crate::render::LIVE_COLOR);
        assert_eq!(reply.cards[1].color, crate::render::UPCOMING_COLOR);
    }

    #[tokio::test]
    async fn test_find_no_hits() {
        let reply = service(vec![], upcoming_fixture())
            .find_reply("nope", 0)
            .await
            .unwrap();
        assert_eq!(reply, Reply::text("No matches found for `nope`."));
    }

    #[tokio::test]
    async fn test_ping_reply() {
        let reply = service(vec![], vec![])
            .reply_for(&CommandRequest::Ping, 0)
            .await
            .unwrap();
        assert_eq!(reply, Reply::text("pong"));
    }
}

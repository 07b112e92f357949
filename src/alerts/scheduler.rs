//! Lead-window polling loop behind [`AlertScheduler`].

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use super::{AlertSettings, AlertSink, AnnouncedSet};
use crate::api::MatchFeed;
use crate::clock::unix_now;
use crate::matches::normalize_all;
use crate::render::render_match_card;

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// No channel configured, channel unresolvable, or fetch failed.
    pub skipped: bool,
    /// Matches inside the lead window this tick.
    pub in_window: usize,
    /// Cards posted.
    pub announced: usize,
    /// Posts that failed.
    pub failed: usize,
}

impl TickReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Periodic lead-window announcer.
pub struct AlertScheduler {
    feed: Arc<dyn MatchFeed>,
    sink: Arc<dyn AlertSink>,
    settings: AlertSettings,
    announced: AnnouncedSet,
}

impl std::fmt::Debug for AlertScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertScheduler")
            .field("settings", &self.settings)
            .field("announced", &self.announced.len())
            .finish_non_exhaustive()
    }
}

impl AlertScheduler {
    #[must_use]
    pub fn new(feed: Arc<dyn MatchFeed>, sink: Arc<dyn AlertSink>, settings: AlertSettings) -> Self {
        Self {
            feed,
            sink,
            settings,
            announced: AnnouncedSet::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &AlertSettings {
        &self.settings
    }

    #[must_use]
    pub fn announced(&self) -> &AnnouncedSet {
        &self.announced
    }

    /// Runs one polling pass at time `now` (epoch seconds).
    ///
    /// Never fails: fetch and post errors are logged and the next tick starts
    /// over.
    #[instrument(skip(self))]
    pub async fn tick(&self, now: i64) -> TickReport {
        let Some(channel_id) = self.settings.channel_id else {
            return TickReport::skipped();
        };
        if !self.sink.channel_ready(channel_id).await {
            debug!(channel_id, "Alert channel not available; skipping tick");
            return TickReport::skipped();
        }

        let segments = match self.feed.upcoming().await {
            Ok(segments) => segments,
            Err(e) => {
                warn!(error = %e, "Upcoming fetch failed; skipping tick");
                return TickReport::skipped();
            }
        };

        let lead_secs = i64::try_from(self.settings.lead.as_secs()).unwrap_or(i64::MAX);
        let mut report = TickReport::default();

        for m in normalize_all(segments, Some(false)) {
            let Some(seconds) = m.seconds_until_start(now) else {
                continue;
            };
            if !(0..=lead_secs).contains(&seconds) {
                continue;
            }
            report.in_window += 1;

            let id = m.stable_id().map(str::to_string);
            if id.as_deref().is_some_and(|id| self.announced.contains(id)) {
                continue;
            }

            let card = render_match_card(&m, false, now);
            match self.sink.post_card(channel_id, &card).await {
                Ok(()) => {
                    report.announced += 1;
                    if let Some(id) = id {
                        self.announced.insert(id);
                    }
                    info!(title = %card.title, seconds, "Match alert posted");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(error = %e, title = %card.title, "Match alert post failed");
                }
            }
        }
        report
    }

    /// Ticks every `interval` once `ready` turns `true`.
    ///
    /// Returns when the readiness sender is dropped before becoming ready;
    /// otherwise runs until the task is aborted.
    pub async fn run(self: Arc<Self>, mut ready: watch::Receiver<bool>) {
        if ready.wait_for(|is_ready| *is_ready).await.is_err() {
            debug!("Readiness channel closed before ready; scheduler not started");
            return;
        }
        info!(
            channel_id = ?self.settings.channel_id,
            interval_secs = self.settings.interval.as_secs(),
            lead_secs = self.settings.lead.as_secs(),
            "Alert scheduler started"
        );

        let mut interval = tokio::time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let report = self.tick(unix_now()).await;
            debug!(?report, "Alert tick finished");
        }
    }
}

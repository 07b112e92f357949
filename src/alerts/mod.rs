//! Start-time alerts posted to a configured channel.
//!
//! [`AlertScheduler`] polls the upcoming feed on a fixed interval once the
//! platform reports ready, and posts one card per match whose start falls
//! inside the lead window. Announced ids are remembered in [`AnnouncedSet`]
//! for the life of the process.

mod scheduler;

pub use scheduler::{AlertScheduler, TickReport};

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashSet;

use crate::interaction::TransportError;
use crate::render::MatchCard;

/// Default lead window.
pub const DEFAULT_LEAD: Duration = Duration::from_secs(30 * 60);

/// Default polling period.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Alert destination and timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertSettings {
    /// Destination channel; `None` disables alerts.
    pub channel_id: Option<u64>,
    /// How long before start a match becomes eligible.
    pub lead: Duration,
    /// Time between ticks.
    pub interval: Duration,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            channel_id: None,
            lead: DEFAULT_LEAD,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Where alert cards go.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Whether `channel_id` resolves to a channel the bot can post in.
    async fn channel_ready(&self, channel_id: u64) -> bool;

    /// Posts one card to `channel_id`.
    async fn post_card(&self, channel_id: u64, card: &MatchCard) -> Result<(), TransportError>;
}

/// Match ids that have already been announced.
///
/// Append-only: ids are inserted after a successful post and never removed.
/// Two concurrent ticks could both miss the same id and announce twice; ticks
/// are sequential in practice so this is tolerated rather than locked.
#[derive(Debug, Default)]
pub struct AnnouncedSet {
    ids: DashSet<String>,
}

impl AnnouncedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Records `id`; returns `false` if it was already present.
    pub fn insert(&self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

//! Valopro Core Library
//!
//! Everything the match bot does apart from talking to the Discord gateway:
//! fetching the vlrggapi feeds, normalizing their records, answering slash
//! commands through a two-phase reply protocol, and posting start alerts.
//!
//! # Architecture
//!
//! - [`matches`] - record model, two-tier normalizer, filter and ordering
//! - [`api`] - `MatchFeed` trait and the reqwest-backed `VlrClient`
//! - [`render`] - platform-neutral match cards
//! - [`interaction`] - acknowledge-then-resolve reply protocol
//! - [`commands`] - slash command catalogue, parsing and result building
//! - [`alerts`] - lead-window alert scheduler
//! - [`config`] - settings from the environment

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod alerts;
pub mod api;
pub mod clock;
pub mod commands;
pub mod config;
pub mod interaction;
pub mod matches;
pub mod render;
mod user_agent;

// Re-export commonly used types
pub use alerts::{AlertScheduler, AlertSettings, AlertSink, AnnouncedSet, TickReport};
pub use api::{ApiError, FeedKind, MatchFeed, VlrClient};
pub use commands::{
    COMMANDS, CommandError, CommandInvocation, CommandRequest, CommandSpec, MatchService,
    OptionKind, OptionValue, dispatch,
};
pub use config::{ConfigError, Settings, SettingsOverrides};
pub use interaction::{
    DeliveryOutcome, InteractionTransport, MessageRef, Reply, TransportError,
    UNKNOWN_INTERACTION_CODE,
};
pub use matches::{MatchScore, NormalizedMatch, RawMatchRecord, normalize, normalize_all};
pub use render::{CardField, MatchCard, render_match_card};

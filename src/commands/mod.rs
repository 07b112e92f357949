//! Slash commands: catalogue, request parsing and result building.
//!
//! The catalogue ([`COMMANDS`]) is registered with the platform on ready.
//! Incoming invocations are parsed into a [`CommandRequest`] and answered by
//! [`dispatch`], which drives the two-phase reply protocol around
//! [`MatchService`].

mod service;

pub use service::{FIND_TIMEOUT, MatchService, TIMEOUT_TEXT, dispatch};

use thiserror::Error;

use crate::api::ApiError;

/// Default number of matches for `/next` and `/upcoming`.
pub const DEFAULT_COUNT: usize = 5;

/// Upper bound on cards per reply.
pub const MAX_CARDS: usize = 10;

/// Query values that list upcoming matches instead of searching.
pub const WILDCARD_QUERIES: [&str; 2] = ["all", "*"];

/// Option value type as registered with the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Integer { min: i64, max: i64 },
    Text,
}

/// One command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub required: bool,
}

/// One slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub options: &'static [OptionSpec],
}

const LIST_OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        name: "count",
        description: "How many to show (1-10)",
        kind: OptionKind::Integer { min: 1, max: 10 },
        required: false,
    },
    OptionSpec {
        name: "filter",
        description: "Filter by team/event/region keyword",
        kind: OptionKind::Text,
        required: false,
    },
];

/// Every command the bot registers.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "next",
        description: "Show upcoming pro matches",
        options: LIST_OPTIONS,
    },
    CommandSpec {
        name: "upcoming",
        description: "Show upcoming pro matches (alias of /next)",
        options: LIST_OPTIONS,
    },
    CommandSpec {
        name: "live",
        description: "Show live matches and current scores",
        options: &[],
    },
    CommandSpec {
        name: "find",
        description: "Search upcoming + live matches",
        options: &[OptionSpec {
            name: "query",
            description: "Team, event, or region keyword (use 'all' or '*' to list upcoming)",
            kind: OptionKind::Text,
            required: true,
        }],
    },
    CommandSpec {
        name: "ping",
        description: "Quick health check",
        options: &[],
    },
];

/// A resolved option value from an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Integer(i64),
    Text(String),
}

/// Command name plus its options, as delivered by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    pub options: Vec<(String, OptionValue)>,
}

impl CommandInvocation {
    /// Creates an invocation with no options.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Adds an option.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options.push((name.into(), value));
        self
    }

    fn integer(&self, name: &str) -> Option<i64> {
        self.options.iter().find_map(|(key, value)| match value {
            OptionValue::Integer(n) if key == name => Some(*n),
            _ => None,
        })
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.options.iter().find_map(|(key, value)| match value {
            OptionValue::Text(text) if key == name => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRequest {
    /// `/next` and `/upcoming`.
    Upcoming {
        count: usize,
        filter: Option<String>,
    },
    /// `/live`.
    Live,
    /// `/find`.
    Find { query: String },
    /// `/ping`.
    Ping,
}

impl CommandRequest {
    /// Parses an invocation, clamping `count` to `1..=10`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownCommand`] for names outside the
    /// catalogue and [`CommandError::MissingOption`] when `/find` has no query.
    pub fn parse(invocation: &CommandInvocation) -> Result<Self, CommandError> {
        match invocation.name.as_str() {
            "next" | "upcoming" => {
                let count = invocation
                    .integer("count")
                    .map_or(DEFAULT_COUNT, clamp_count);
                let filter = invocation
                    .text("filter")
                    .filter(|text| !text.trim().is_empty())
                    .map(str::to_string);
                Ok(Self::Upcoming { count, filter })
            }
            "live" => Ok(Self::Live),
            "find" => invocation
                .text("query")
                .map(|query| Self::Find {
                    query: query.to_string(),
                })
                .ok_or_else(|| CommandError::MissingOption {
                    command: "find".to_string(),
                    option: "query".to_string(),
                }),
            "ping" => Ok(Self::Ping),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    /// Text of the provisional acknowledgment; `None` for commands answered
    /// immediately.
    #[must_use]
    pub fn provisional_text(&self) -> Option<String> {
        match self {
            Self::Upcoming { .. } => Some("Searching upcoming…".to_string()),
            Self::Live => Some("Checking live matches…".to_string()),
            Self::Find { query } => Some(format!("Searching for `{query}`…")),
            Self::Ping => None,
        }
    }
}

fn clamp_count(requested: i64) -> usize {
    usize::try_from(requested.clamp(1, MAX_CARDS as i64)).unwrap_or(DEFAULT_COUNT)
}

/// Errors produced while answering a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The platform delivered a command that is not in the catalogue.
    #[error("unknown command '/{0}'")]
    UnknownCommand(String),

    /// A required option was absent.
    #[error("/{command} requires the '{option}' option")]
    MissingOption {
        /// Command name.
        command: String,
        /// Option name.
        option: String,
    },

    /// The match API could not be fetched.
    #[error("match API unavailable: {0}")]
    Fetch(#[from] ApiError),
}

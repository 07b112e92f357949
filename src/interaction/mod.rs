//! Two-phase replies to slash-command interactions.
//!
//! Results can take longer than the platform's initial-response deadline, so
//! every command first acknowledges with a provisional message and later
//! edits that message with the final [`Reply`]. The transport is abstracted
//! behind [`InteractionTransport`] so the protocol in [`protocol`] runs the
//! same against Discord and against test fakes.

mod protocol;

pub use protocol::{
    AckRoute, DeliveryOutcome, PendingInteraction, acknowledge, acknowledge_then_resolve,
};

use async_trait::async_trait;
use thiserror::Error;

use crate::render::MatchCard;

/// Discord's "Unknown interaction" JSON error code (reply token expired).
pub const UNKNOWN_INTERACTION_CODE: isize = 10062;

/// Final (or provisional) content for a user-facing message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub content: Option<String>,
    pub cards: Vec<MatchCard>,
}

impl Reply {
    /// A plain text reply with no cards.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            cards: Vec::new(),
        }
    }

    /// A header line followed by cards.
    #[must_use]
    pub fn with_cards(content: impl Into<String>, cards: Vec<MatchCard>) -> Self {
        Self {
            content: Some(content.into()),
            cards,
        }
    }
}

/// Location of an ordinary channel message the bot posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub channel_id: u64,
    pub message_id: u64,
}

/// Failures reported by a transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The interaction reply token is no longer valid.
    #[error("interaction token expired")]
    TokenExpired,

    /// The platform answered with an error.
    #[error("platform rejected request (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Platform error message.
        message: String,
    },

    /// Anything else (connection errors, serialization, missing channel).
    #[error("{0}")]
    Other(String),
}

/// The message operations one interaction needs.
///
/// Each value is bound to a single invocation: its reply token, channel and
/// invoking user.
#[async_trait]
pub trait InteractionTransport: Send + Sync {
    /// Mention string for the invoking user, e.g. `<@123>`.
    fn user_mention(&self) -> String;

    /// Sends the initial interaction response.
    async fn acknowledge(&self, content: &str, ephemeral: bool) -> Result<(), TransportError>;

    /// Edits the initial interaction response.
    async fn edit_acknowledgment(&self, reply: &Reply) -> Result<(), TransportError>;

    /// Posts an ordinary message in the invocation's channel.
    async fn post_to_channel(&self, reply: &Reply) -> Result<MessageRef, TransportError>;

    /// Edits an ordinary message previously returned by [`Self::post_to_channel`].
    async fn edit_channel_message(
        &self,
        message: MessageRef,
        reply: &Reply,
    ) -> Result<(), TransportError>;
}

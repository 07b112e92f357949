//! Acknowledge-then-resolve state machine.
//!
//! ```text
//! acknowledge ──ok──────────────► Interaction ─┐
//!      │                                       ├─ resolve: edit ──ok──► EditedInPlace
//!      └─expired/other─► post ──► ChannelPost ─┘        │
//!                          └─fail─► Unacknowledged ─────┴─ post new ──► PostedFresh / Lost
//! ```
//!
//! There is exactly one fallback per phase and no retries.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tracing::{debug, error, warn};

use super::{InteractionTransport, MessageRef, Reply, TransportError};

/// Where the provisional message ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckRoute {
    /// The interaction response itself; delivery edits it.
    Interaction,
    /// A plain channel post carrying the user's mention; delivery edits it.
    ChannelPost(MessageRef),
    /// Neither acknowledgment path worked; delivery posts a new message.
    Unacknowledged,
}

/// How the final reply reached the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Answered in the initial response; nothing was deferred.
    Immediate,
    /// The provisional message was edited.
    EditedInPlace,
    /// A fresh channel message was posted instead.
    PostedFresh,
    /// Every path failed; the failure has been logged.
    Lost,
}

/// An acknowledged request waiting for its result.
#[derive(Debug)]
#[must_use = "an acknowledged interaction must be resolved"]
pub struct PendingInteraction {
    route: AckRoute,
}

impl PendingInteraction {
    /// The acknowledgment route taken.
    pub fn route(&self) -> AckRoute {
        self.route
    }

    /// Delivers the final reply: edit the acknowledgment, else post fresh.
    pub async fn resolve<T>(self, transport: &T, reply: &Reply) -> DeliveryOutcome
    where
        T: InteractionTransport + ?Sized,
    {
        let edited = match self.route {
            AckRoute::Interaction => transport.edit_acknowledgment(reply).await,
            AckRoute::ChannelPost(message) => transport.edit_channel_message(message, reply).await,
            AckRoute::Unacknowledged => {
                return post_fresh(transport, reply).await;
            }
        };

        match edited {
            Ok(()) => {
                debug!(route = ?self.route, "Reply delivered by edit");
                DeliveryOutcome::EditedInPlace
            }
            Err(e) => {
                warn!(error = %e, route = ?self.route, "Edit failed; sending new message");
                post_fresh(transport, reply).await
            }
        }
    }
}

async fn post_fresh<T>(transport: &T, reply: &Reply) -> DeliveryOutcome
where
    T: InteractionTransport + ?Sized,
{
    match transport.post_to_channel(reply).await {
        Ok(_) => DeliveryOutcome::PostedFresh,
        Err(e) => {
            error!(error = %e, "Reply could not be delivered");
            DeliveryOutcome::Lost
        }
    }
}

/// Sends the ephemeral provisional message.
///
/// If the interaction cannot be answered (expired token or any other
/// failure) the provisional text is posted to the channel with the user's
/// mention instead, and that post becomes the message to edit.
pub async fn acknowledge<T>(transport: &T, provisional: &str) -> PendingInteraction
where
    T: InteractionTransport + ?Sized,
{
    match transport.acknowledge(provisional, true).await {
        Ok(()) => {
            return PendingInteraction {
                route: AckRoute::Interaction,
            };
        }
        Err(TransportError::TokenExpired) => {
            debug!("Interaction token expired; acknowledging in channel");
        }
        Err(e) => {
            warn!(error = %e, "Interaction acknowledgment failed; acknowledging in channel");
        }
    }

    let mention = transport.user_mention();
    let content = if mention.is_empty() {
        provisional.to_string()
    } else {
        format!("{mention} {provisional}")
    };
    let route = match transport.post_to_channel(&Reply::text(content)).await {
        Ok(message) => AckRoute::ChannelPost(message),
        Err(e) => {
            warn!(error = %e, "Channel acknowledgment failed");
            AckRoute::Unacknowledged
        }
    };
    PendingInteraction { route }
}

/// Runs one command end to end: acknowledge, compute, deliver.
///
/// Errors and panics from `compute` become an `Error: ...` reply delivered
/// through the same edit-or-post path, so the user always gets an answer.
pub async fn acknowledge_then_resolve<T, F, E>(
    transport: &T,
    provisional: &str,
    compute: F,
) -> DeliveryOutcome
where
    T: InteractionTransport + ?Sized,
    F: Future<Output = Result<Reply, E>>,
    E: Display,
{
    let pending = acknowledge(transport, provisional).await;

    let reply = match AssertUnwindSafe(compute).catch_unwind().await {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => {
            error!(error = %e, "Command failed");
            Reply::text(format!("Error: {e}"))
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(panic = %message, "Command panicked");
            Reply::text(format!("Error: {message}"))
        }
    };

    pending.resolve(transport, &reply).await
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "internal error".to_string()
    }
}

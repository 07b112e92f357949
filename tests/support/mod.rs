//! Shared fakes and fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use valopro_core::{
    AlertSink, ApiError, InteractionTransport, MatchCard, MatchFeed, MessageRef, Reply,
    TransportError,
};
use wiremock::MockServer;

/// Starts a wiremock server, or returns `None` when the sandbox forbids
/// binding a loopback socket.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    match std::net::TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => {
            drop(listener);
            Some(MockServer::start().await)
        }
        Err(e) => {
            eprintln!("skipping: cannot bind loopback socket ({e})");
            None
        }
    }
}

/// `{ "data": { "segments": [...] } }`
pub fn envelope(segments: Vec<Value>) -> Value {
    json!({ "data": { "status": 200, "segments": segments } })
}

pub fn upcoming_segment(id: &str, team1: &str, team2: &str, event: &str, start: i64) -> Value {
    json!({
        "team1": team1,
        "team2": team2,
        "match_event": event,
        "match_series": "Playoffs",
        "time_unix": start,
        "match_page": format!("https://www.vlr.gg/{id}/x"),
        "match_id": id,
    })
}

pub fn live_segment(team1: &str, team2: &str, score1: &str, score2: &str) -> Value {
    json!({
        "team1": team1,
        "team2": team2,
        "score1": score1,
        "score2": score2,
        "match_event": "Champions Tour",
        "match_page": "https://www.vlr.gg/999/live",
    })
}

/// Feed returning fixed segments, optionally after a delay.
pub struct StaticFeed {
    pub live: Vec<Value>,
    pub upcoming: Vec<Value>,
    pub delay: Duration,
}

impl StaticFeed {
    pub fn new(live: Vec<Value>, upcoming: Vec<Value>) -> Self {
        Self {
            live,
            upcoming,
            delay: Duration::ZERO,
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl MatchFeed for StaticFeed {
    async fn upcoming(&self) -> Result<Vec<Value>, ApiError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.upcoming.clone())
    }

    async fn live(&self) -> Result<Vec<Value>, ApiError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.live.clone())
    }
}

/// One call made against [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Acknowledge { content: String, ephemeral: bool },
    EditAcknowledgment(Reply),
    Post(Reply),
    EditPost(MessageRef, Reply),
}

/// Transport that records every call and fails on request.
#[derive(Default)]
pub struct RecordingTransport {
    pub ack_error: Option<TransportError>,
    pub edit_error: Option<TransportError>,
    pub calls: Mutex<Vec<TransportCall>>,
}

pub const POSTED_MESSAGE: MessageRef = MessageRef {
    channel_id: 500,
    message_id: 900,
};

impl RecordingTransport {
    pub fn expired() -> Self {
        Self {
            ack_error: Some(TransportError::TokenExpired),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The reply the user finally sees.
    pub fn final_reply(&self) -> Option<Reply> {
        self.calls().into_iter().rev().find_map(|call| match call {
            TransportCall::EditAcknowledgment(reply)
            | TransportCall::Post(reply)
            | TransportCall::EditPost(_, reply) => Some(reply),
            TransportCall::Acknowledge { .. } => None,
        })
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl InteractionTransport for RecordingTransport {
    fn user_mention(&self) -> String {
        "<@1234>".to_string()
    }

    async fn acknowledge(&self, content: &str, ephemeral: bool) -> Result<(), TransportError> {
        self.record(TransportCall::Acknowledge {
            content: content.to_string(),
            ephemeral,
        });
        self.ack_error.clone().map_or(Ok(()), Err)
    }

    async fn edit_acknowledgment(&self, reply: &Reply) -> Result<(), TransportError> {
        self.record(TransportCall::EditAcknowledgment(reply.clone()));
        self.edit_error.clone().map_or(Ok(()), Err)
    }

    async fn post_to_channel(&self, reply: &Reply) -> Result<MessageRef, TransportError> {
        self.record(TransportCall::Post(reply.clone()));
        Ok(POSTED_MESSAGE)
    }

    async fn edit_channel_message(
        &self,
        message: MessageRef,
        reply: &Reply,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::EditPost(message, reply.clone()));
        self.edit_error.clone().map_or(Ok(()), Err)
    }
}

/// Alert sink that records posted cards.
#[derive(Default)]
pub struct RecordingSink {
    posted: Mutex<Vec<(u64, MatchCard)>>,
}

impl RecordingSink {
    pub fn posted(&self) -> Vec<(u64, MatchCard)> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn channel_ready(&self, _channel_id: u64) -> bool {
        true
    }

    async fn post_card(&self, channel_id: u64, card: &MatchCard) -> Result<(), TransportError> {
        self.posted.lock().unwrap().push((channel_id, card.clone()));
        Ok(())
    }
}

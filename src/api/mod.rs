//! Upstream match API.
//!
//! - [`MatchFeed`] - async trait the scheduler and commands fetch through
//! - [`VlrClient`] - reqwest implementation against vlrggapi
//! - [`ApiError`] - fetch failures (network, timeout, status, decode)

mod client;
mod error;

pub use client::{
    DEFAULT_BASE_URL, FeedKind, REQUEST_TIMEOUT_SECS, VlrClient, extract_segments,
};
pub use error::ApiError;

use async_trait::async_trait;
use serde_json::Value;

/// Source of raw match segments.
///
/// Implementations return segments untouched; normalization happens in
/// [`crate::matches`].
#[async_trait]
pub trait MatchFeed: Send + Sync {
    /// Segments from `q=upcoming`.
    async fn upcoming(&self) -> Result<Vec<Value>, ApiError>;

    /// Segments from `q=live_score`.
    async fn live(&self) -> Result<Vec<Value>, ApiError>;
}

//! HTTP client for the unofficial vlrggapi match endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::user_agent;

use super::{ApiError, MatchFeed};

/// Public vlrggapi deployment.
pub const DEFAULT_BASE_URL: &str = "https://vlrggapi.vercel.app";

/// Total per-request timeout.
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Which `/match` listing to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Upcoming,
    Live,
}

impl FeedKind {
    /// Value of the `q` query parameter.
    #[must_use]
    pub fn query(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Live => "live_score",
        }
    }
}

/// Client for `GET {base}/match?q=...`.
///
/// One instance is shared by the alert scheduler and every command handler;
/// reqwest pools connections internally.
pub struct VlrClient {
    client: Client,
    base_url: Url,
}

impl VlrClient {
    /// Creates a client for the public deployment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Setup`] if HTTP client construction fails.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL (self-hosted API, wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Setup`] if the URL does not parse or the HTTP
    /// client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::setup(format!("invalid API base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::setup(format!(
                "API base URL '{base_url}' cannot carry a path"
            )));
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent::default_user_agent())
            .gzip(true)
            .build()
            .map_err(|e| ApiError::setup(format!("HTTP client construction failed: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// The base URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `{base}/match?q={kind}`, keeping any path prefix on the base.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Setup`] if the base URL cannot take path segments.
    pub fn endpoint(&self, kind: FeedKind) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::setup("API base URL cannot carry a path"))?
            .pop_if_empty()
            .push("match");
        url.query_pairs_mut().clear().append_pair("q", kind.query());
        Ok(url)
    }

    /// Fetches one listing and returns its raw segments.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure, timeout, non-2xx status or a
    /// body that is not JSON. A JSON body without `data.segments` is an empty
    /// listing, not an error.
    #[instrument(skip(self), fields(feed = kind.query()))]
    pub async fn fetch_segments(&self, kind: FeedKind) -> Result<Vec<Value>, ApiError> {
        let url = self.endpoint(kind)?;
        debug!(api_url = %url, "Calling match API");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ApiError::from_send(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Match API error status");
            return Err(ApiError::http_status(url.as_str(), status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::from_body(url.as_str(), e))?;
        let segments = extract_segments(body);
        debug!(segments = segments.len(), "Match API responded");
        Ok(segments)
    }
}

impl std::fmt::Debug for VlrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VlrClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MatchFeed for VlrClient {
    async fn upcoming(&self) -> Result<Vec<Value>, ApiError> {
        self.fetch_segments(FeedKind::Upcoming).await
    }

    async fn live(&self) -> Result<Vec<Value>, ApiError> {
        self.fetch_segments(FeedKind::Live).await
    }
}

/// Pulls `data.segments` out of a response envelope.
///
/// Missing keys, nulls or a non-array `segments` all mean "no segments".
#[must_use]
pub fn extract_segments(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Object(mut data)) => match data.remove("segments") {
                Some(Value::Array(segments)) => segments,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_appends_match_path_and_query() {
        let client = VlrClient::with_base_url("https://vlrggapi.vercel.app").unwrap();
        assert_eq!(
            client.endpoint(FeedKind::Upcoming).unwrap().as_str(),
            "https://vlrggapi.vercel.app/match?q=upcoming"
        );
        assert_eq!(
            client.endpoint(FeedKind::Live).unwrap().as_str(),
            "https://vlrggapi.vercel.app/match?q=live_score"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = VlrClient::with_base_url("http://localhost:3001/api/").unwrap();
        assert_eq!(
            client.endpoint(FeedKind::Upcoming).unwrap().as_str(),
            "http://localhost:3001/api/match?q=upcoming"
        );
    }

    #[test]
    fn test_invalid_base_url_is_setup_error() {
        let err = VlrClient::with_base_url("not a url").unwrap_err();
        assert!(matches!(err, ApiError::Setup { .. }));
        let err = VlrClient::with_base_url("mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, ApiError::Setup { .. }));
    }

    #[test]
    fn test_extract_segments_envelope() {
        let body = json!({"data": {"status": 200, "segments": [{"team1": "A"}, "TBD"]}});
        assert_eq!(extract_segments(body).len(), 2);
    }

    #[test]
    fn test_extract_segments_tolerates_missing_pieces() {
        assert!(extract_segments(json!({})).is_empty());
        assert!(extract_segments(json!({"data": null})).is_empty());
        assert!(extract_segments(json!({"data": {"segments": null}})).is_empty());
        assert!(extract_segments(json!({"data": {"segments": {"0": {}}}})).is_empty());
        assert!(extract_segments(json!([1, 2, 3])).is_empty());
    }
}

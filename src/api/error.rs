//! Error types for upstream API calls.

use thiserror::Error;

/// Errors that can occur while fetching match segments.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection-level failure (DNS, refused connection, TLS, reset).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The request URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The request did not complete within the per-call timeout.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The request URL.
        url: String,
    },

    /// Non-2xx response from the API.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not JSON.
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        /// The request URL.
        url: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client or request URL could not be built.
    #[error("API client setup failed: {reason}")]
    Setup {
        /// What went wrong.
        reason: String,
    },
}

impl ApiError {
    /// Classifies a reqwest send error as timeout or network failure.
    pub fn from_send(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Classifies a body read/decode error.
    pub fn from_body(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Decode { url, source }
        }
    }

    /// Creates a setup error.
    pub fn setup(reason: impl Into<String>) -> Self {
        Self::Setup {
            reason: reason.into(),
        }
    }

    /// Returns true for timeouts.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

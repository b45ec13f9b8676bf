//! Transport seam for the loader.
//!
//! A [`Transport`] moves bytes for one GET and nothing more: the loader decides
//! when each transport is tried, how long it may take and how its body is
//! interpreted. [`HttpTransport`] is the production implementation backed by
//! `reqwest`; tests substitute scripted transports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CACHE_CONTROL};
use reqwest::Client;
use thiserror::Error;

/// Failure of a single transport attempt.
///
/// Never terminal on its own; the loader folds attempt failures into a
/// [`LoadError`](crate::domain::LoadError).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// The request could not be completed (DNS, connect, TLS, read).
    #[error("network error: {0}")]
    Network(String),

    /// The remote end answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The attempt exceeded the configured timeout.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Performs a GET and returns the response body as text.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`, failing on transport errors and non-success statuses.
    async fn get(&self, url: &str) -> Result<String, TransportFailure>;
}

/// `reqwest`-backed transport.
///
/// Requests are sent with `Cache-Control: no-store` so a reload after a token
/// change never observes a cached payload for a previous identity.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport whose client enforces `timeout` per request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportFailure::Network`] if the TLS backend cannot be
    /// initialized.
    pub fn new(timeout: Duration) -> Result<Self, TransportFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportFailure::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, TransportFailure> {
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
            .send()
            .await
            .map_err(|e| TransportFailure::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportFailure::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| TransportFailure::Network(format!("failed to read body: {e}")))
    }
}

//! Network loading: resolve an endpoint to a URL, fetch it once, decode the JSON.
//!
//! One attempt per call. No retry, no caching, no timeout beyond the transport
//! default. [`Fetch`] is the seam the orchestrator is tested through.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::SearchError;

/// Transport seam: one GET, raw bytes back.
///
/// Production uses [`HttpFetch`]; tests substitute an in-memory fake.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: Url) -> Result<Vec<u8>, SearchError>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn fetch(&self, url: Url) -> Result<Vec<u8>, SearchError> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Fetches and decodes API responses.
#[derive(Clone)]
pub struct Loader {
    transport: Arc<dyn Fetch>,
    base_url: String,
}

impl Loader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            transport: Arc::new(HttpFetch::new()),
            base_url: base_url.into(),
        }
    }

    /// Loader over a substituted transport.
    pub fn with_transport(base_url: impl Into<String>, transport: Arc<dyn Fetch>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Fetch one endpoint and decode the response into the expected shape.
    ///
    /// Fails with [`SearchError::InvalidUrl`] when the descriptor cannot produce
    /// a URL, [`SearchError::Transport`] on network/status failures, and
    /// [`SearchError::Decode`] when the payload does not match `T`.
    pub async fn load<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, SearchError> {
        let url = endpoint.url(&self.base_url)?;
        // The full URL carries the API credential; log the path only.
        tracing::debug!(path = endpoint.path().as_str(), "loading endpoint");
        let bytes = self.transport.fetch(url).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

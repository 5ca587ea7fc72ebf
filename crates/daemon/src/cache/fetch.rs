// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The fetch contract and request canonicalization.
//!
//! [`Fetcher`] abstracts the network so the response cache can be exercised
//! against an offline or scripted network in tests. [`HttpFetcher`] is the
//! production implementation over `reqwest`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use ql_ipc::{FetchRequest, FetchResponse, ResponseSource};
use url::Url;

/// Why a fetch produced no response at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport failure: offline, DNS, reset or timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be turned into a valid URL or method.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for fetches.
pub type FetchResult = std::result::Result<FetchResponse, FetchError>;

/// Performs network fetches.
///
/// A non-2xx status is still a response; only transport failures are errors.
pub trait Fetcher: Send + Sync {
    /// Fetches `url` with the method of `request`.
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
        url: &'a Url,
    ) -> Pin<Box<dyn Future<Output = FetchResult> + Send + 'a>>;
}

/// Resolves a request URL against the origin and drops the fragment.
pub fn canonical_url(origin: &Url, raw: &str) -> Result<Url, FetchError> {
    let mut url = origin
        .join(raw)
        .map_err(|e| FetchError::InvalidRequest(format!("{}: {}", raw, e)))?;
    url.set_fragment(None);
    Ok(url)
}

/// The cache key of a request: upper-case method, a space, the canonical URL.
pub fn request_key(method: &str, url: &Url) -> String {
    format!("{} {}", method.to_ascii_uppercase(), url)
}

/// Fetches over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a per-request timeout.
    pub fn new(timeout: Duration) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpFetcher { client })
    }

    async fn send(&self, request: &FetchRequest, url: &Url) -> FetchResult {
        let method = reqwest::Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| FetchError::InvalidRequest(format!("{}: {}", request.method, e)))?;

        let response = self
            .client
            .request(method, url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(FetchResponse {
            status,
            content_type,
            body: body.to_vec(),
            source: ResponseSource::Network,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
        url: &'a Url,
    ) -> Pin<Box<dyn Future<Output = FetchResult> + Send + 'a>> {
        Box::pin(self.send(request, url))
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;

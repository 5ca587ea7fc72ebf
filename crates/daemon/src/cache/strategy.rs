// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Strategy selection for read traffic.
//!
//! Rules, evaluated in order once the cache is active:
//! 1. non-GET, or a path under an excluded prefix: passthrough, never cached
//! 2. navigation: network-first, falling back to the exact entry, then `/`
//! 3. any other GET: cache-first, populating on a 2xx miss
//! 4. an image that failed both ways gets the placeholder
//!
//! Before [`ResponseCache::activate`] every request passes through untouched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use ql_core::CacheConfig;
use ql_ipc::{Destination, FetchRequest, FetchResponse, ResponseSource};
use url::Url;

use super::fetch::{canonical_url, request_key, FetchError, FetchResult, Fetcher};
use super::store::{CacheEntry, CacheStore};
use crate::error::{Error, Result};

/// Placeholder served when an image cannot be fetched or found in the cache.
pub const BUNDLED_PLACEHOLDER: &[u8] = include_bytes!("../../assets/placeholder.svg");

/// Content type of the bundled placeholder.
pub const PLACEHOLDER_CONTENT_TYPE: &str = "image/svg+xml";

/// How a request is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Straight to the network, never cached.
    Passthrough,
    /// Network, then cache.
    NetworkFirst,
    /// Cache, then network.
    CacheFirst,
}

/// The response cache of the background context.
pub struct ResponseCache {
    store: CacheStore,
    fetcher: Arc<dyn Fetcher>,
    origin: Url,
    excluded_prefixes: Vec<String>,
    placeholder_path: String,
    active: AtomicBool,
}

impl ResponseCache {
    /// Builds the cache over an opened store.
    pub fn new(store: CacheStore, fetcher: Arc<dyn Fetcher>, config: &CacheConfig) -> Result<Self> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl {
            url: config.origin.clone(),
            reason: e.to_string(),
        })?;

        Ok(ResponseCache {
            store,
            fetcher,
            origin,
            excluded_prefixes: config.excluded_prefixes.clone(),
            placeholder_path: config.placeholder_image.clone(),
            active: AtomicBool::new(false),
        })
    }

    /// Current namespace name.
    pub fn namespace(&self) -> &str {
        self.store.namespace()
    }

    /// Whether strategies apply yet.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Seeds the app shell and the placeholder. Returns how many were stored.
    ///
    /// A failed asset is logged and skipped. The placeholder always ends up
    /// cached: when the origin cannot serve it the bundled copy is stored.
    pub async fn install(&self, critical_assets: &[String]) -> usize {
        let mut seeded = 0;

        for asset in critical_assets {
            match self.seed(asset).await {
                Ok(()) => seeded += 1,
                Err(e) => tracing::warn!(asset = %asset, "failed to seed asset: {}", e),
            }
        }

        match self.seed(&self.placeholder_path).await {
            Ok(()) => seeded += 1,
            Err(e) => {
                tracing::debug!("placeholder not served by origin ({}), storing bundled copy", e);
                if self.store_bundled_placeholder() {
                    seeded += 1;
                }
            }
        }

        tracing::info!(seeded, namespace = %self.namespace(), "cache installed");
        seeded
    }

    /// Evicts every other namespace and starts applying strategies.
    ///
    /// Takes effect for every subsequent request, including those from
    /// contexts that connected before activation.
    pub fn activate(&self) -> Result<Vec<String>> {
        let removed = self.store.delete_stale_namespaces()?;
        self.active.store(true, Ordering::Release);
        tracing::info!(namespace = %self.namespace(), removed = removed.len(), "cache activated");
        Ok(removed)
    }

    /// Chooses the strategy for a request.
    pub fn classify(&self, request: &FetchRequest, url: &Url) -> Strategy {
        if !request.method.eq_ignore_ascii_case("GET") {
            return Strategy::Passthrough;
        }
        let path = url.path();
        if self
            .excluded_prefixes
            .iter()
            .any(|prefix| is_excluded(path, prefix))
        {
            return Strategy::Passthrough;
        }
        if request.navigate {
            Strategy::NetworkFirst
        } else {
            Strategy::CacheFirst
        }
    }

    /// Serves a read request.
    pub async fn handle(&self, request: &FetchRequest) -> FetchResult {
        let url = canonical_url(&self.origin, &request.url)?;

        if !self.is_active() {
            return self.fetcher.fetch(request, &url).await;
        }

        let strategy = self.classify(request, &url);
        tracing::debug!(url = %url, ?strategy, "handling fetch");

        let result = match strategy {
            Strategy::Passthrough => return self.fetcher.fetch(request, &url).await,
            Strategy::NetworkFirst => self.network_first(request, &url).await,
            Strategy::CacheFirst => self.cache_first(request, &url).await,
        };

        match result {
            Err(e) if request.destination == Destination::Image => {
                tracing::debug!(url = %url, "serving placeholder after: {}", e);
                Ok(self.placeholder())
            }
            other => other,
        }
    }

    async fn network_first(&self, request: &FetchRequest, url: &Url) -> FetchResult {
        let key = request_key(&request.method, url);
        match self.fetcher.fetch(request, url).await {
            Ok(response) => {
                if response.is_success() {
                    self.remember(&key, &response);
                }
                Ok(response)
            }
            Err(e) => {
                if let Some(cached) = self.lookup(&key) {
                    return Ok(cached);
                }
                let root = self.root_key();
                if let Some(cached) = self.lookup(&root) {
                    tracing::debug!(url = %url, "offline navigation, serving cached root document");
                    return Ok(cached);
                }
                Err(e)
            }
        }
    }

    async fn cache_first(&self, request: &FetchRequest, url: &Url) -> FetchResult {
        let key = request_key(&request.method, url);
        if let Some(cached) = self.lookup(&key) {
            return Ok(cached);
        }

        let response = self.fetcher.fetch(request, url).await?;
        if response.is_success() {
            self.remember(&key, &response);
        }
        Ok(response)
    }

    async fn seed(&self, path: &str) -> std::result::Result<(), FetchError> {
        let request = FetchRequest::get(path);
        let url = canonical_url(&self.origin, path)?;
        let response = self.fetcher.fetch(&request, &url).await?;
        if !response.is_success() {
            return Err(FetchError::Network(format!("status {}", response.status)));
        }
        let key = request_key(&request.method, &url);
        self.store
            .put(&to_entry(key, &response))
            .map_err(|e| FetchError::Network(format!("cache write failed: {}", e)))
    }

    fn store_bundled_placeholder(&self) -> bool {
        let Some(key) = self.placeholder_key() else {
            return false;
        };
        let entry = CacheEntry {
            request_key: key,
            status: 200,
            content_type: Some(PLACEHOLDER_CONTENT_TYPE.to_string()),
            body: BUNDLED_PLACEHOLDER.to_vec(),
            stored_at: Utc::now(),
        };
        match self.store.put(&entry) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to store bundled placeholder: {}", e);
                false
            }
        }
    }

    /// The cached placeholder, else the bundled bytes.
    fn placeholder(&self) -> FetchResponse {
        let cached = self.placeholder_key().and_then(|key| self.lookup(&key));
        let (content_type, body) = match cached {
            Some(response) => (response.content_type, response.body),
            None => (
                Some(PLACEHOLDER_CONTENT_TYPE.to_string()),
                BUNDLED_PLACEHOLDER.to_vec(),
            ),
        };
        FetchResponse {
            status: 200,
            content_type,
            body,
            source: ResponseSource::Placeholder,
        }
    }

    fn placeholder_key(&self) -> Option<String> {
        canonical_url(&self.origin, &self.placeholder_path)
            .ok()
            .map(|url| request_key("GET", &url))
    }

    fn root_key(&self) -> String {
        let mut root = self.origin.clone();
        root.set_path("/");
        root.set_query(None);
        root.set_fragment(None);
        request_key("GET", &root)
    }

    /// Cache read; errors count as a miss.
    fn lookup(&self, key: &str) -> Option<FetchResponse> {
        match self.store.get(key) {
            Ok(entry) => entry.map(|entry| FetchResponse {
                status: entry.status,
                content_type: entry.content_type,
                body: entry.body,
                source: ResponseSource::Cache,
            }),
            Err(e) => {
                tracing::warn!(key, "cache read failed: {}", e);
                None
            }
        }
    }

    /// Cache write; errors are logged and swallowed.
    fn remember(&self, key: &str, response: &FetchResponse) {
        if let Err(e) = self.store.put(&to_entry(key.to_string(), response)) {
            tracing::warn!(key, "cache write failed: {}", e);
        }
    }
}

fn to_entry(request_key: String, response: &FetchResponse) -> CacheEntry {
    CacheEntry {
        request_key,
        status: response.status,
        content_type: response.content_type.clone(),
        body: response.body.clone(),
        stored_at: Utc::now(),
    }
}

/// `/api/` excludes `/api/quests` and the bare `/api`, but not `/apiary`.
fn is_excluded(path: &str, prefix: &str) -> bool {
    path.starts_with(prefix)
        || prefix
            .strip_suffix('/')
            .is_some_and(|bare| !bare.is_empty() && path == bare)
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Response cache: the on-disk store, the fetch contract, and the strategies
//! that decide which of the two serves a request.

mod fetch;
mod store;
mod strategy;

pub use fetch::{canonical_url, request_key, FetchError, FetchResult, Fetcher, HttpFetcher};
pub use store::{CacheEntry, CacheStore};
pub use strategy::{ResponseCache, Strategy, BUNDLED_PLACEHOLDER, PLACEHOLDER_CONTENT_TYPE};

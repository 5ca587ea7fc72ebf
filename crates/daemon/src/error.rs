// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the background worker.

use thiserror::Error;

/// Errors raised while starting or running the worker.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ql_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("another worker instance is already running: {0}")]
    AlreadyRunning(String),

    #[error("worker is shutting down")]
    ShuttingDown,
}

/// A specialized Result type for worker operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ql-core operations.

use thiserror::Error;

/// All possible errors that can occur in ql-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid operation type: '{0}'\n  hint: valid types are: quest-completion, mood-update, profile-update")]
    InvalidOperationType(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("queue lock error: {0}")]
    Lock(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized Result type for ql-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

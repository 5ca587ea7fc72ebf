// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the questline CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ql_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid payload: {0}\n  hint: the payload must be a JSON object, e.g. '{{\"questId\": \"q1\"}}'")]
    InvalidPayload(String),

    #[error("cannot determine state directory\n  hint: set QUESTLINE_STATE_DIR or pass --state-dir")]
    StateDirUnknown,

    #[error("worker is not running\n  hint: start it with 'ql worker start'")]
    WorkerNotRunning,

    #[error("worker error: {0}")]
    Worker(String),

    #[error("worker version mismatch: worker is v{worker_version}, CLI is v{cli_version}")]
    WorkerVersionMismatch {
        worker_version: String,
        cli_version: String,
    },

    #[error("worker timeout: {0}")]
    WorkerTimeout(String),

    #[error("unexpected worker response: {0}")]
    UnexpectedResponse(String),
}

/// A specialized Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

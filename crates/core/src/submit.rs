// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The submit contract: deliver one pending operation to the remote API.
//!
//! [`Submitter`] is the seam the sync coordinator drives; [`HttpSubmitter`]
//! is the production implementation over `reqwest`. Routes:
//!
//! | operation type     | request                      |
//! |--------------------|------------------------------|
//! | `quest-completion` | `POST {base}/quests/complete` |
//! | `mood-update`      | `POST {base}/mood`           |
//! | `profile-update`   | `PUT {base}/profile`         |
//!
//! Every request carries `Idempotency-Key: <operation id>` so a resubmit
//! after a lost acknowledgement is harmless.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Method;

use crate::error::Result;
use crate::operation::{OperationType, PendingOperation};

/// Header carrying the operation id.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Why a submission did not succeed. The operation stays queued in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Network unreachable, connection reset or timed out.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The server answered with a non-2xx status.
    #[error("rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// This build has no route for the operation type.
    #[error("unsupported operation type: {0}")]
    Unsupported(String),
}

/// Result of one submission.
pub type SubmitResult = std::result::Result<(), SubmitError>;

/// Delivers pending operations to the remote API.
pub trait Submitter: Send + Sync {
    /// Submits one operation; `Ok` means the server acknowledged it.
    fn submit<'a>(
        &'a self,
        op: &'a PendingOperation,
    ) -> Pin<Box<dyn Future<Output = SubmitResult> + Send + 'a>>;
}

/// Returns the HTTP method and path for a known operation type.
pub fn route(operation_type: &OperationType) -> Option<(Method, &'static str)> {
    match operation_type {
        OperationType::QuestCompletion => Some((Method::POST, "quests/complete")),
        OperationType::MoodUpdate => Some((Method::POST, "mood")),
        OperationType::ProfileUpdate => Some((Method::PUT, "profile")),
        OperationType::Other(_) => None,
    }
}

/// Submits operations over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSubmitter {
    /// Creates a submitter for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpSubmitter {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The full URL an operation type is sent to.
    pub fn endpoint(&self, operation_type: &OperationType) -> Option<(Method, String)> {
        route(operation_type).map(|(method, path)| (method, format!("{}/{}", self.base_url, path)))
    }

    async fn send(&self, op: &PendingOperation) -> SubmitResult {
        let Some((method, url)) = self.endpoint(&op.operation_type) else {
            return Err(SubmitError::Unsupported(op.operation_type.to_string()));
        };

        let response = self
            .client
            .request(method, &url)
            .header(IDEMPOTENCY_HEADER, &op.id)
            .json(&op.payload)
            .send()
            .await
            .map_err(|e| SubmitError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown").to_string()
        } else {
            body.trim().to_string()
        };
        Err(SubmitError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl Submitter for HttpSubmitter {
    fn submit<'a>(
        &'a self,
        op: &'a PendingOperation,
    ) -> Pin<Box<dyn Future<Output = SubmitResult> + Send + 'a>> {
        Box::pin(self.send(op))
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;

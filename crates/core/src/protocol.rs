// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Messages the background context broadcasts to foreground contexts.
//!
//! The envelope is a JSON object tagged by `type`:
//! - `{"type":"SYNC_STARTED"}` when a drain begins
//! - `{"type":"SYNC_COMPLETED","results":[...]}` when a drain finishes
//! - `{"type":"NETWORK_CHANGED","online":true}` on connectivity changes

use serde::{Deserialize, Serialize};

/// Outcome of submitting one pending operation during a drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// Id of the operation that was submitted.
    pub operation_id: String,
    /// Whether the remote API acknowledged it.
    pub success: bool,
    /// Failure reason, absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    /// Creates a successful result.
    pub fn ok(operation_id: impl Into<String>) -> Self {
        SyncResult {
            operation_id: operation_id.into(),
            success: true,
            error: None,
        }
    }

    /// Creates a failed result with a reason.
    pub fn failed(operation_id: impl Into<String>, error: impl Into<String>) -> Self {
        SyncResult {
            operation_id: operation_id.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Messages sent from the background context to every open foreground context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackgroundMessage {
    /// A drain of the pending store has begun.
    SyncStarted,

    /// A drain finished; one result per submitted operation.
    SyncCompleted {
        /// Per-operation outcomes, possibly empty.
        results: Vec<SyncResult>,
    },

    /// Connectivity changed.
    NetworkChanged {
        /// True when the network became reachable.
        online: bool,
    },
}

impl BackgroundMessage {
    /// Creates a SyncCompleted message.
    pub fn sync_completed(results: Vec<SyncResult>) -> Self {
        BackgroundMessage::SyncCompleted { results }
    }

    /// Creates a NetworkChanged message.
    pub fn network_changed(online: bool) -> Self {
        BackgroundMessage::NetworkChanged { online }
    }

    /// Number of successful submissions carried by a SyncCompleted message.
    pub fn success_count(&self) -> usize {
        match self {
            BackgroundMessage::SyncCompleted { results } => {
                results.iter().filter(|r| r.success).count()
            }
            _ => 0,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

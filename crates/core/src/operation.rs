// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending operations: user mutations awaiting delivery to the remote API.
//!
//! The persisted record shape is fixed because operations can sit in the
//! queue across an app upgrade:
//!
//! ```json
//! {"id": "1700000000000-0a1b2c3d4e5f", "operationType": "quest-completion",
//!  "data": {"questId": "q1"}, "timestamp": 1700000000000}
//! ```
//!
//! Unknown fields are ignored and unknown operation types are kept verbatim.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::to_utc;
use crate::error::{Error, Result};

/// The kind of mutation a pending operation carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationType {
    /// A quest was marked complete.
    QuestCompletion,
    /// A mood journal entry was written or changed.
    MoodUpdate,
    /// Profile fields were edited.
    ProfileUpdate,
    /// A type this build does not know, written by another app version.
    Other(String),
}

impl OperationType {
    /// All types this build can submit.
    pub const KNOWN: [OperationType; 3] = [
        OperationType::QuestCompletion,
        OperationType::MoodUpdate,
        OperationType::ProfileUpdate,
    ];

    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &str {
        match self {
            OperationType::QuestCompletion => "quest-completion",
            OperationType::MoodUpdate => "mood-update",
            OperationType::ProfileUpdate => "profile-update",
            OperationType::Other(s) => s,
        }
    }

    /// Returns false for types carried over from another app version.
    pub fn is_known(&self) -> bool {
        !matches!(self, OperationType::Other(_))
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for OperationType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "quest-completion" => OperationType::QuestCompletion,
            "mood-update" => OperationType::MoodUpdate,
            "profile-update" => OperationType::ProfileUpdate,
            _ => OperationType::Other(s),
        }
    }
}

impl From<OperationType> for String {
    fn from(t: OperationType) -> Self {
        match t {
            OperationType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// Strict parse for user input: only known types are accepted.
impl FromStr for OperationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match OperationType::from(s.to_string()) {
            OperationType::Other(_) => Err(Error::InvalidOperationType(s.to_string())),
            known => Ok(known),
        }
    }
}

/// A durable record of a user mutation awaiting network delivery.
///
/// Immutable once created; the store only ever appends or removes whole
/// records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Unique, collision-resistant identifier.
    pub id: String,
    /// What kind of mutation this is.
    #[serde(rename = "operationType")]
    pub operation_type: OperationType,
    /// Opaque payload handed to the submit contract.
    #[serde(rename = "data")]
    pub payload: Value,
    /// Creation time in milliseconds since Unix epoch.
    #[serde(rename = "timestamp")]
    pub created_at: u64,
}

impl PendingOperation {
    /// Creates a new pending operation.
    pub fn new(id: String, operation_type: OperationType, payload: Value, created_at: u64) -> Self {
        PendingOperation {
            id,
            operation_type,
            payload,
            created_at,
        }
    }

    /// Creation time as a UTC timestamp.
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        to_utc(self.created_at)
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;

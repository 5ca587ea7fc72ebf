// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync status as seen by one execution context.
//!
//! Never persisted. Each context rebuilds it from the pending store on start
//! and then keeps it current from broadcasts (foreground) or from its own
//! drains (background).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::{BackgroundMessage, SyncResult};
use crate::queue::PendingStore;

/// Aggregate sync state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    /// A drain is in progress.
    pub is_syncing: bool,
    /// When the last drain finished, successful or not.
    pub last_sync_attempt: Option<DateTime<Utc>>,
    /// When a drain last delivered at least one operation.
    pub last_successful_sync: Option<DateTime<Utc>>,
    /// Operations still waiting for an acknowledgement.
    pub pending_count: usize,
}

impl SyncStatus {
    /// Rebuilds the status of a freshly started context.
    pub fn load(store: &PendingStore) -> Result<Self> {
        Ok(SyncStatus {
            pending_count: store.count()?,
            ..SyncStatus::default()
        })
    }

    /// Accounts for an operation this context just enqueued.
    pub fn record_enqueue(&mut self) {
        self.pending_count += 1;
    }

    /// Marks a drain as started.
    pub fn begin_drain(&mut self) {
        self.is_syncing = true;
    }

    /// Folds a finished drain into the status.
    ///
    /// `pending` is the store count read after the drain, so operations
    /// enqueued during the drain are included.
    pub fn complete_drain(&mut self, results: &[SyncResult], now: DateTime<Utc>, pending: usize) {
        self.is_syncing = false;
        self.last_sync_attempt = Some(now);
        if results.iter().any(|r| r.success) {
            self.last_successful_sync = Some(now);
        }
        self.pending_count = pending;
    }

    /// Applies a broadcast received from the background context.
    pub fn apply(
        &mut self,
        msg: &BackgroundMessage,
        now: DateTime<Utc>,
        store: &PendingStore,
    ) -> Result<()> {
        match msg {
            BackgroundMessage::SyncStarted => self.begin_drain(),
            BackgroundMessage::SyncCompleted { results } => {
                let pending = store.count()?;
                self.complete_drain(results, now, pending);
            }
            BackgroundMessage::NetworkChanged { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable store of operations awaiting delivery.
//!
//! Records live in `pending_ops.jsonl`, one [`PendingOperation`] per line.
//! Both the foreground CLI and the background worker open the same file, so
//! every read-modify-write holds an advisory lock on `pending_ops.lock`:
//! exclusive for `enqueue` and `remove`, shared for `list`.
//!
//! Lines that fail to parse are skipped by `list` and written back untouched
//! by `remove`; a corrupt record is never silently dropped.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use serde::Deserialize;
use serde_json::Value;

use crate::clock::{ClockSource, SystemClock};
use crate::error::{Error, Result};
use crate::id::generate_operation_id;
use crate::jsonl;
use crate::operation::{OperationType, PendingOperation};

/// File name of the queue inside the state directory.
pub const QUEUE_FILE: &str = "pending_ops.jsonl";

/// File name of the lock sidecar inside the state directory.
pub const LOCK_FILE: &str = "pending_ops.lock";

/// Just enough of a record to match it by id.
#[derive(Deserialize)]
struct RecordId {
    id: String,
}

/// Held advisory lock; released on drop.
struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("failed to release queue lock: {}", e);
        }
    }
}

/// Multi-process safe store of pending operations.
#[derive(Clone)]
pub struct PendingStore {
    path: PathBuf,
    lock_path: PathBuf,
    clock: Arc<dyn ClockSource>,
}

impl std::fmt::Debug for PendingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl PendingStore {
    /// Opens (creating if needed) the store in `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        Self::with_clock(dir, Arc::new(SystemClock))
    }

    /// Opens the store with an explicit clock for operation timestamps.
    pub fn with_clock(dir: &Path, clock: Arc<dyn ClockSource>) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(QUEUE_FILE);
        OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(PendingStore {
            path,
            lock_path: dir.join(LOCK_FILE),
            clock,
        })
    }

    /// Path of the queue file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably appends a new operation and returns its id.
    ///
    /// The record is fsynced before this returns.
    pub fn enqueue(&self, operation_type: OperationType, payload: Value) -> Result<String> {
        Ok(self.enqueue_operation(operation_type, payload)?.id)
    }

    /// Like [`PendingStore::enqueue`] but returns the whole stored record.
    pub fn enqueue_operation(
        &self,
        operation_type: OperationType,
        payload: Value,
    ) -> Result<PendingOperation> {
        let op = self.new_operation(operation_type, payload);
        self.insert(&op)?;
        Ok(op)
    }

    /// Builds a record with a fresh id without storing it.
    pub fn new_operation(&self, operation_type: OperationType, payload: Value) -> PendingOperation {
        let now = self.clock.now_ms();
        PendingOperation::new(generate_operation_id(now), operation_type, payload, now)
    }

    /// Durably appends a record built by [`PendingStore::new_operation`].
    ///
    /// Keeps the record's id, so a mutation that was first tried directly is
    /// retried under the same idempotency key.
    pub fn insert(&self, op: &PendingOperation) -> Result<()> {
        let _guard = self.lock(true)?;
        jsonl::append(&self.path, op)?;
        tracing::debug!(id = %op.id, operation_type = %op.operation_type, "enqueued operation");
        Ok(())
    }

    /// Returns every readable operation in enqueue order.
    pub fn list(&self) -> Result<Vec<PendingOperation>> {
        let _guard = self.lock(false)?;
        jsonl::read_all(&self.path)
    }

    /// Removes the operation with the given id.
    ///
    /// Returns `false` if no record had that id. Malformed lines are kept.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let _guard = self.lock(true)?;

        let lines = jsonl::read_lines(&self.path)?;
        let before = lines.len();
        let kept: Vec<Vec<u8>> = lines
            .into_iter()
            .filter(|line| match serde_json::from_slice::<RecordId>(line) {
                Ok(record) => record.id != id,
                Err(_) => true,
            })
            .collect();

        if kept.len() == before {
            return Ok(false);
        }

        jsonl::replace_lines(&self.path, &kept)?;
        tracing::debug!(id, "removed operation");
        Ok(true)
    }

    /// Number of readable pending operations.
    pub fn count(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }

    /// Returns true when nothing is pending.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.count()? == 0)
    }

    fn lock(&self, exclusive: bool) -> Result<LockGuard> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;

        let locked = if exclusive {
            FileExt::lock_exclusive(&file)
        } else {
            FileExt::lock_shared(&file)
        };
        locked.map_err(|e| Error::Lock(format!("{}: {}", self.lock_path.display(), e)))?;

        Ok(LockGuard { file })
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

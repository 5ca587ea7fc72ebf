// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! A foreground context: one `ql` invocation's view of the sync layer.
//!
//! It owns a local [`SyncStatus`] recomputed from the pending store on open,
//! bumps it on enqueue, and folds in broadcasts from the worker.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use ql_core::{BackgroundMessage, Config, OperationType, PendingOperation, PendingStore, SyncStatus};
use serde_json::Value;

use crate::error::{Error, Result};

pub struct ForegroundContext {
    state_dir: PathBuf,
    config: Config,
    store: PendingStore,
    status: SyncStatus,
}

impl ForegroundContext {
    /// Opens the context for a state directory, creating it if needed.
    pub fn open(state_dir: &Path) -> Result<Self> {
        fs::create_dir_all(state_dir)?;
        let config = Config::load(state_dir)?;
        let store = PendingStore::open(state_dir)?;
        let status = SyncStatus::load(&store)?;
        Ok(ForegroundContext {
            state_dir: state_dir.to_path_buf(),
            config,
            store,
            status,
        })
    }

    /// Picks the state directory: explicit flag, then the environment.
    pub fn resolve_state_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
        explicit
            .or_else(ql_core::env::resolve_state_dir)
            .ok_or(Error::StateDirUnknown)
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &PendingStore {
        &self.store
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// Durably queues a mutation and counts it as pending.
    pub fn enqueue(&mut self, operation_type: OperationType, payload: Value) -> Result<String> {
        let id = self.store.enqueue(operation_type, payload)?;
        self.status.record_enqueue();
        Ok(id)
    }

    /// Queues a record prepared earlier, keeping its id.
    pub fn queue(&mut self, op: &PendingOperation) -> Result<()> {
        self.store.insert(op)?;
        self.status.record_enqueue();
        Ok(())
    }

    /// Folds a background message into the local status.
    pub fn apply(&mut self, message: &BackgroundMessage) -> Result<()> {
        self.status.apply(message, Utc::now(), &self.store)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod fetch;
pub mod list;
pub mod status;
pub mod submit;
pub mod sync;
pub mod watch;
pub mod worker;

use std::path::Path;

use ql_ipc::WorkerStatus;

use crate::error::Result;
use crate::worker::{get_socket_path, get_worker_status, spawn_worker, WorkerClient};

/// Connects to the worker for the state directory, starting it if needed.
pub fn connect_worker(state_dir: &Path) -> Result<WorkerClient> {
    spawn_worker(state_dir)?;
    let mut client = WorkerClient::connect(&get_socket_path(state_dir))?;
    client.hello()?;
    Ok(client)
}

/// Status of an already running worker. Never starts one.
///
/// A worker that cannot be reached counts as not running.
pub fn running_worker(state_dir: &Path) -> Option<WorkerStatus> {
    match get_worker_status(state_dir) {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!("worker did not answer: {}", e);
            None
        }
    }
}

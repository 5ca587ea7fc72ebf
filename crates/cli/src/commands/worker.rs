// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Worker management commands.
//!
//! Commands for controlling the questlined worker that owns the response
//! cache and drains the pending store.

use std::path::Path;

use crate::error::{Error, Result};
use crate::worker::{detect_worker, get_worker_status, spawn_worker, stop_worker_forcefully};

/// Show worker status.
pub fn status(state_dir: &Path) -> Result<()> {
    match get_worker_status(state_dir) {
        Ok(Some(status)) => {
            println!("Status: running");
            println!("PID: {}", status.pid);
            println!("Uptime: {}s", status.uptime_secs);
            println!("Network: {}", if status.online { "online" } else { "offline" });
            println!("Pending: {}", status.sync.pending_count);
        }
        Ok(None) => {
            println!("Status: not running");
        }
        Err(e) => {
            println!("Status: error ({})", e);
        }
    }

    Ok(())
}

/// Stop the worker.
pub fn stop(state_dir: &Path) -> Result<()> {
    match stop_worker_forcefully(state_dir) {
        Ok(true) => println!("Worker stopped."),
        Ok(false) => println!("Worker is not running."),
        Err(e) => println!("Failed to stop worker: {}", e),
    }

    Ok(())
}

/// Start the worker.
pub fn start(state_dir: &Path) -> Result<()> {
    match detect_worker(state_dir)? {
        Some(info) => {
            println!("Worker is already running (PID: {})", info.pid);
        }
        None => match spawn_worker(state_dir) {
            Ok(info) => {
                println!("Worker started (PID: {})", info.pid);
            }
            Err(e) => {
                return Err(Error::Worker(format!("failed to start worker: {}", e)));
            }
        },
    }

    Ok(())
}

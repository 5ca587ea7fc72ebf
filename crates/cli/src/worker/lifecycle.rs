// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Worker lifecycle management: spawn, detect, cleanup.
//!
//! The worker (questlined) is spawned as a background process and communicates
//! via Unix socket. PID and socket files live in the state directory.

use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use ql_ipc::{WorkerStatus, PID_NAME, SOCKET_NAME};

use crate::error::{Error, Result};

use super::client::WorkerClient;

/// Name of the worker executable.
const WORKER_BINARY: &str = "questlined";

/// Information about a running worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerInfo {
    /// Process ID of the worker.
    pub pid: u32,
}

/// Get the socket path for the given state directory.
pub fn get_socket_path(state_dir: &Path) -> PathBuf {
    state_dir.join(SOCKET_NAME)
}

fn get_pid_path(state_dir: &Path) -> PathBuf {
    state_dir.join(PID_NAME)
}

/// Detect if a worker is running for the given state directory.
///
/// Returns Some(WorkerInfo) if a worker is running and responding,
/// None otherwise. Cleans up stale PID/socket files if found.
pub fn detect_worker(state_dir: &Path) -> Result<Option<WorkerInfo>> {
    let socket_path = get_socket_path(state_dir);
    let pid_path = get_pid_path(state_dir);

    if !socket_path.exists() {
        if pid_path.exists() {
            let _ = fs::remove_file(&pid_path);
        }
        return Ok(None);
    }

    let alive = WorkerClient::connect(&socket_path).and_then(|mut client| client.ping());
    if alive.is_err() {
        cleanup_stale_files(state_dir);
        return Ok(None);
    }

    match read_pid_file(&pid_path) {
        Some(pid) if pid > 0 => Ok(Some(WorkerInfo { pid })),
        // PID file missing or invalid - worker may be starting up
        _ => Ok(None),
    }
}

/// Get worker status by connecting to the worker. `None` if not running.
pub fn get_worker_status(state_dir: &Path) -> Result<Option<WorkerStatus>> {
    let socket_path = get_socket_path(state_dir);
    if !socket_path.exists() {
        return Ok(None);
    }

    match WorkerClient::connect(&socket_path) {
        Ok(mut client) => client.status().map(Some),
        Err(_) => {
            cleanup_stale_files(state_dir);
            Ok(None)
        }
    }
}

/// Find the questlined binary.
fn find_worker_binary() -> PathBuf {
    if let Some(path) = ql_core::env::worker_binary() {
        return path;
    }

    if let Ok(exe) = std::env::current_exe() {
        let sibling = exe.with_file_name(WORKER_BINARY);
        if sibling.exists() {
            return sibling;
        }
    }

    PathBuf::from(WORKER_BINARY)
}

/// Spawn a worker for the state directory unless one is already running.
///
/// The worker holds an exclusive lock on its state directory, so racing
/// spawns end with a single instance.
pub fn spawn_worker(state_dir: &Path) -> Result<WorkerInfo> {
    spawn_worker_with(state_dir, &find_worker_binary())
}

pub(crate) fn spawn_worker_with(state_dir: &Path, binary: &Path) -> Result<WorkerInfo> {
    if let Some(info) = detect_worker(state_dir)? {
        return Ok(info);
    }

    fs::create_dir_all(state_dir)?;

    let mut child = Command::new(binary)
        .arg("--state-dir")
        .arg(state_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Error::Worker(format!(
                "failed to start {} ({}): {}",
                WORKER_BINARY,
                binary.display(),
                e
            ))
        })?;

    // Wait for the worker to signal it's ready (writes "READY" to stdout)
    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        for line in reader.lines() {
            match line {
                Ok(line) if line == "READY" => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    }

    for _ in 0..150 {
        // An exited child means startup failed
        if let Ok(Some(status)) = child.try_wait() {
            let mut stderr_output = String::new();
            if let Some(mut stderr) = child.stderr.take() {
                let _ = stderr.read_to_string(&mut stderr_output);
            }
            return Err(Error::Worker(format!(
                "worker exited with status: {}\n{}",
                status,
                stderr_output.trim()
            )));
        }

        if let Some(info) = detect_worker(state_dir)? {
            tracing::debug!(pid = info.pid, "worker started");
            return Ok(info);
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    Err(Error::Worker(
        "worker failed to start: could not connect after multiple attempts".to_string(),
    ))
}

/// Stops the worker, forcefully if graceful shutdown fails.
///
/// Returns false if no worker was running.
pub fn stop_worker_forcefully(state_dir: &Path) -> Result<bool> {
    let socket_path = get_socket_path(state_dir);
    let pid = read_pid_file(&get_pid_path(state_dir));

    if !socket_path.exists() && pid.is_none() {
        return Ok(false);
    }

    let graceful = WorkerClient::connect(&socket_path).and_then(|mut client| client.shutdown());
    match graceful {
        Ok(()) => {
            if let Some(pid) = pid {
                wait_for_process_exit(pid, Duration::from_secs(2));
            }
        }
        Err(e) => {
            tracing::debug!("graceful shutdown failed: {}", e);
            if let Some(pid) = pid {
                let _ = Command::new("kill").arg("-9").arg(pid.to_string()).output();
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }

    cleanup_stale_files(state_dir);
    Ok(true)
}

/// Clean up stale socket and PID files.
fn cleanup_stale_files(state_dir: &Path) {
    let _ = fs::remove_file(get_socket_path(state_dir));
    let _ = fs::remove_file(get_pid_path(state_dir));
}

fn read_pid_file(pid_path: &Path) -> Option<u32> {
    fs::read_to_string(pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

fn wait_for_process_exit(pid: u32, timeout: Duration) {
    let start = Instant::now();

    while start.elapsed() < timeout {
        let result = Command::new("kill").arg("-0").arg(pid.to_string()).output();

        match result {
            Ok(output) if !output.status.success() => return,
            Err(_) => return,
            _ => {}
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

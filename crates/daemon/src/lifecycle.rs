// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance guard and runtime files for the worker.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use ql_ipc::{LOCK_NAME, LOG_NAME, PID_NAME, SOCKET_NAME};

use crate::error::{Error, Result};

/// Runtime file locations inside a state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    pub state_dir: PathBuf,
    pub socket: PathBuf,
    pub pid: PathBuf,
    pub lock: PathBuf,
    pub log: PathBuf,
}

impl RuntimePaths {
    pub fn new(state_dir: &Path) -> Self {
        RuntimePaths {
            state_dir: state_dir.to_path_buf(),
            socket: state_dir.join(SOCKET_NAME),
            pid: state_dir.join(PID_NAME),
            lock: state_dir.join(LOCK_NAME),
            log: state_dir.join(LOG_NAME),
        }
    }
}

/// Holds the instance lock; released on drop.
#[derive(Debug)]
pub struct InstanceLock {
    _file: File,
}

/// Takes the exclusive instance lock without blocking.
pub fn acquire_lock(lock_path: &Path) -> Result<InstanceLock> {
    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    FileExt::try_lock_exclusive(&file)
        .map_err(|_| Error::AlreadyRunning(lock_path.display().to_string()))?;
    Ok(InstanceLock { _file: file })
}

pub fn write_pid(pid_path: &Path) -> Result<()> {
    fs::write(pid_path, format!("{}", std::process::id()))?;
    Ok(())
}

/// Removes the pid file and socket. Missing files are fine.
pub fn cleanup(paths: &RuntimePaths) {
    let _ = fs::remove_file(&paths.pid);
    let _ = fs::remove_file(&paths.socket);
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

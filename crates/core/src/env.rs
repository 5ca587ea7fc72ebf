// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The variable name constants are generated by `build.rs` and live in the
//! [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

/// Returns the value of `QUESTLINE_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    non_empty(vars::QUESTLINE_STATE_DIR)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    non_empty(vars::XDG_STATE_HOME)
}

/// Returns the value of `QUESTLINE_WORKER_BINARY` if set.
pub fn worker_binary() -> Option<PathBuf> {
    non_empty(vars::QUESTLINE_WORKER_BINARY)
}

/// Resolves the state directory shared by the CLI and the worker.
///
/// Order: `QUESTLINE_STATE_DIR`, `$XDG_STATE_HOME/questline`,
/// `~/.local/state/questline`.
pub fn resolve_state_dir() -> Option<PathBuf> {
    if let Some(dir) = state_dir() {
        return Some(dir);
    }
    if let Some(xdg) = xdg_state_home() {
        return Some(xdg.join("questline"));
    }
    dirs::home_dir().map(|home| home.join(".local/state/questline"))
}

fn non_empty(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;

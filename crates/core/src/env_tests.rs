// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn vars_constants() {
    assert_eq!(vars::QUESTLINE_STATE_DIR, "QUESTLINE_STATE_DIR");
    assert_eq!(vars::QUESTLINE_WORKER_BINARY, "QUESTLINE_WORKER_BINARY");
    assert_eq!(vars::XDG_STATE_HOME, "XDG_STATE_HOME");
    assert_eq!(vars::RUST_LOG, "RUST_LOG");
}

// One test mutates the process environment so the cases cannot race.
#[test]
fn state_dir_resolution_order() {
    std::env::set_var(vars::QUESTLINE_STATE_DIR, "/tmp/ql-explicit");
    std::env::set_var(vars::XDG_STATE_HOME, "/tmp/ql-xdg");
    assert_eq!(resolve_state_dir(), Some(PathBuf::from("/tmp/ql-explicit")));

    std::env::set_var(vars::QUESTLINE_STATE_DIR, "");
    assert_eq!(state_dir(), None);
    assert_eq!(resolve_state_dir(), Some(PathBuf::from("/tmp/ql-xdg/questline")));

    std::env::remove_var(vars::QUESTLINE_STATE_DIR);
    std::env::remove_var(vars::XDG_STATE_HOME);
    let fallback = resolve_state_dir();
    if let Some(home) = dirs::home_dir() {
        assert_eq!(fallback, Some(home.join(".local/state/questline")));
    }

    std::env::set_var(vars::QUESTLINE_WORKER_BINARY, "/opt/questlined");
    assert_eq!(worker_binary(), Some(PathBuf::from("/opt/questlined")));
    std::env::remove_var(vars::QUESTLINE_WORKER_BINARY);
    assert_eq!(worker_binary(), None);
}

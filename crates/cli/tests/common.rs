// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// A `ql` command bound to `state`. No real worker can be spawned from it.
pub fn ql(state: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("ql");
    cmd.env_remove("QUESTLINE_STATE_DIR")
        .env("QUESTLINE_WORKER_BINARY", "/nonexistent/questlined")
        .env("RUST_LOG", "off")
        .arg("--state-dir")
        .arg(state.path());
    cmd
}

/// Points the API at a closed local port so direct submits fail fast.
pub fn write_offline_config(state: &Path) {
    std::fs::write(
        state.join("questline.toml"),
        "api_base_url = \"http://127.0.0.1:1/api\"\n\n[sync]\nsubmit_timeout_secs = 2\n",
    )
    .unwrap();
}

/// Queues a mutation and returns its id.
pub fn queue(state: &TempDir, operation_type: &str, payload: &str) -> String {
    let output = ql(state)
        .args(["submit", operation_type, payload, "--queue", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    json["id"].as_str().unwrap().to_string()
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod common;
use common::*;

#[test]
fn status_without_worker_uses_the_local_store() {
    let state = TempDir::new().unwrap();
    queue(&state, "quest-completion", r#"{"questId": "q1"}"#);

    ql(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("pending:          1"))
        .stdout(predicate::str::contains("last attempt:     never"))
        .stdout(predicate::str::contains("worker:           not running"));
}

#[test]
fn status_json_has_no_worker() {
    let state = TempDir::new().unwrap();

    let output = ql(&state).args(["status", "-o", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["worker"].is_null());
    assert_eq!(json["sync"]["pendingCount"], 0);
    assert_eq!(json["sync"]["isSyncing"], false);
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    started = { BackgroundMessage::SyncStarted, json!({"type": "SYNC_STARTED"}) },
    completed_empty = { BackgroundMessage::sync_completed(vec![]), json!({"type": "SYNC_COMPLETED", "results": []}) },
    online = { BackgroundMessage::network_changed(true), json!({"type": "NETWORK_CHANGED", "online": true}) },
    offline = { BackgroundMessage::network_changed(false), json!({"type": "NETWORK_CHANGED", "online": false}) },
)]
fn message_wire_shape(msg: BackgroundMessage, expected: serde_json::Value) {
    let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
    assert_eq!(value, expected);
    assert_eq!(BackgroundMessage::from_json(&value.to_string()).unwrap(), msg);
}

#[test]
fn completed_results_use_camel_case() {
    let msg = BackgroundMessage::sync_completed(vec![
        SyncResult::ok("op-1"),
        SyncResult::failed("op-2", "status 500"),
    ]);

    let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "SYNC_COMPLETED",
            "results": [
                {"operationId": "op-1", "success": true},
                {"operationId": "op-2", "success": false, "error": "status 500"},
            ],
        })
    );
}

#[test]
fn success_count_only_counts_successes() {
    let msg = BackgroundMessage::sync_completed(vec![
        SyncResult::ok("a"),
        SyncResult::failed("b", "offline"),
        SyncResult::ok("c"),
    ]);
    assert_eq!(msg.success_count(), 2);
    assert_eq!(BackgroundMessage::SyncStarted.success_count(), 0);
}

#[test]
fn unknown_message_type_is_rejected() {
    assert!(BackgroundMessage::from_json(r#"{"type":"SOMETHING_ELSE"}"#).is_err());
}

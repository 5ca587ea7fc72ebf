// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use ql_core::SyncResult;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn open_creates_the_state_dir() {
    let dir = tempdir().unwrap();
    let state = dir.path().join("nested").join("state");

    let ctx = ForegroundContext::open(&state).unwrap();
    assert!(state.is_dir());
    assert_eq!(ctx.state_dir(), state);
    assert_eq!(ctx.status(), &SyncStatus::default());
}

#[test]
fn open_counts_operations_left_by_other_contexts() {
    let dir = tempdir().unwrap();
    let other = PendingStore::open(dir.path()).unwrap();
    other.enqueue(OperationType::MoodUpdate, json!({"mood": 3})).unwrap();
    other.enqueue(OperationType::MoodUpdate, json!({"mood": 4})).unwrap();

    let ctx = ForegroundContext::open(dir.path()).unwrap();
    assert_eq!(ctx.status().pending_count, 2);
}

#[test]
fn enqueue_persists_and_counts() {
    let dir = tempdir().unwrap();
    let mut ctx = ForegroundContext::open(dir.path()).unwrap();

    let id = ctx
        .enqueue(OperationType::QuestCompletion, json!({"questId": "q1"}))
        .unwrap();

    assert_eq!(ctx.status().pending_count, 1);
    let ops = ctx.store().list().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].id, id);
    assert_eq!(ops[0].payload, json!({"questId": "q1"}));
}

#[test]
fn queue_keeps_a_prepared_record() {
    let dir = tempdir().unwrap();
    let mut ctx = ForegroundContext::open(dir.path()).unwrap();
    let op = ctx
        .store()
        .new_operation(OperationType::ProfileUpdate, json!({"name": "Ada"}));

    ctx.queue(&op).unwrap();

    assert_eq!(ctx.status().pending_count, 1);
    assert_eq!(ctx.store().list().unwrap()[0].id, op.id);
}

#[test]
fn sync_completed_recomputes_from_the_store() {
    let dir = tempdir().unwrap();
    let mut ctx = ForegroundContext::open(dir.path()).unwrap();
    let id = ctx
        .enqueue(OperationType::QuestCompletion, json!({"questId": "q1"}))
        .unwrap();

    ctx.apply(&BackgroundMessage::SyncStarted).unwrap();
    assert!(ctx.status().is_syncing);

    // The worker removed it before broadcasting.
    ctx.store().remove(&id).unwrap();
    ctx.apply(&BackgroundMessage::sync_completed(vec![SyncResult::ok(id)]))
        .unwrap();

    let status = ctx.status();
    assert!(!status.is_syncing);
    assert_eq!(status.pending_count, 0);
    assert!(status.last_successful_sync.is_some());
}

#[test]
fn config_is_loaded_from_the_state_dir() {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.api_base_url = "https://quests.example.test/api".into();
    config.save(dir.path()).unwrap();

    let ctx = ForegroundContext::open(dir.path()).unwrap();
    assert_eq!(ctx.config().api_base_url, "https://quests.example.test/api");
}

#[test]
fn explicit_state_dir_wins() {
    let resolved = ForegroundContext::resolve_state_dir(Some(PathBuf::from("/explicit"))).unwrap();
    assert_eq!(resolved, PathBuf::from("/explicit"));
}

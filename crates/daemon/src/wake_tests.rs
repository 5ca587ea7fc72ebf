// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use super::*;
use crate::broadcast::StatusBroadcaster;
use crate::sync::{Coordinator, CoordinatorConfig, RetryPolicy, DEAD_LETTER_FILE};
use crate::test_support::ScriptedSubmitter;
use ql_core::{BackgroundMessage, ManualClock, PendingStore};
use tempfile::{tempdir, TempDir};
use tokio::sync::broadcast;

const TAG: &str = "sync-quest-completions";

fn coordinator(
    submitter: Arc<ScriptedSubmitter>,
) -> (TempDir, CoordinatorHandle, broadcast::Receiver<BackgroundMessage>) {
    let dir = tempdir().unwrap();
    let broadcaster = StatusBroadcaster::default();
    let events = broadcaster.subscribe();
    let (handle, _task) = Coordinator::spawn(
        PendingStore::open(dir.path()).unwrap(),
        submitter,
        broadcaster,
        Arc::new(ManualClock::new(0)),
        CoordinatorConfig {
            policy: RetryPolicy::immediate(),
            submit_timeout: None,
            dead_letter_path: dir.path().join(DEAD_LETTER_FILE),
        },
    )
    .unwrap();
    (dir, handle, events)
}

#[test]
fn probe_reflects_interval() {
    assert!(BackgroundWake::new(TAG, Some(Duration::from_secs(60))).probe());
    assert!(!BackgroundWake::new(TAG, Some(Duration::ZERO)).probe());
    assert!(!BackgroundWake::new(TAG, None).probe());
}

#[test]
fn from_config_uses_tag_and_interval() {
    let wake = BackgroundWake::from_config(&SyncConfig::default());
    assert_eq!(wake.tag(), TAG);
    assert!(wake.probe());

    let disabled = SyncConfig {
        wake_interval_secs: 0,
        ..SyncConfig::default()
    };
    assert!(!BackgroundWake::from_config(&disabled).probe());
}

#[tokio::test]
async fn known_tag_starts_a_drain() {
    let (_dir, handle, _events) = coordinator(ScriptedSubmitter::new(Ok(())));
    let wake = BackgroundWake::new(TAG, None);
    assert_eq!(wake.deliver(TAG, &handle).await, Some(TriggerOutcome::Started));
}

#[tokio::test]
async fn unknown_tag_is_ignored() {
    let (_dir, handle, mut events) = coordinator(ScriptedSubmitter::new(Ok(())));
    let wake = BackgroundWake::new(TAG, None);

    assert_eq!(wake.deliver("refresh-feed", &handle).await, None);
    assert!(events.try_recv().is_err());
    assert!(!handle.status().is_syncing);
}

#[tokio::test]
async fn wake_during_drain_is_dropped() {
    let submitter = ScriptedSubmitter::gated(Ok(()));
    let (dir, handle, _events) = coordinator(submitter.clone());
    PendingStore::open(dir.path())
        .unwrap()
        .enqueue(ql_core::OperationType::QuestCompletion, serde_json::json!({}))
        .unwrap();
    let wake = BackgroundWake::new(TAG, None);

    assert_eq!(wake.deliver(TAG, &handle).await, Some(TriggerOutcome::Started));
    assert_eq!(
        wake.deliver(TAG, &handle).await,
        Some(TriggerOutcome::AlreadySyncing)
    );
    submitter.release(1);
}

#[tokio::test]
async fn unsupported_wake_spawns_nothing() {
    let (_dir, handle, _events) = coordinator(ScriptedSubmitter::new(Ok(())));
    let wake = BackgroundWake::new(TAG, None);
    assert!(wake
        .spawn_periodic(handle, CancellationToken::new())
        .is_none());
}

#[tokio::test]
async fn periodic_wake_fires_until_cancelled() {
    let (_dir, handle, mut events) = coordinator(ScriptedSubmitter::new(Ok(())));
    let wake = BackgroundWake::new(TAG, Some(Duration::from_millis(20)));
    let cancel = CancellationToken::new();

    let task = wake.spawn_periodic(handle, cancel.clone()).unwrap();

    let first = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, BackgroundMessage::SyncStarted);

    cancel.cancel();
    task.await.unwrap();
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::sync::{Coordinator, CoordinatorConfig, RetryPolicy, DEAD_LETTER_FILE};
use crate::test_support::ScriptedSubmitter;
use ql_core::{ManualClock, OperationType, PendingStore};
use tempfile::{tempdir, TempDir};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use yare::parameterized;

struct Harness {
    _dir: TempDir,
    store: PendingStore,
    submitter: Arc<ScriptedSubmitter>,
    events: broadcast::Receiver<BackgroundMessage>,
    observer: Arc<NetworkObserver>,
}

fn harness() -> Harness {
    let dir = tempdir().unwrap();
    let store = PendingStore::open(dir.path()).unwrap();
    let submitter = ScriptedSubmitter::new(Ok(()));
    let broadcaster = StatusBroadcaster::default();
    let events = broadcaster.subscribe();
    let (handle, _task) = Coordinator::spawn(
        store.clone(),
        submitter.clone(),
        broadcaster.clone(),
        Arc::new(ManualClock::new(0)),
        CoordinatorConfig {
            policy: RetryPolicy::immediate(),
            submit_timeout: None,
            dead_letter_path: dir.path().join(DEAD_LETTER_FILE),
        },
    )
    .unwrap();

    Harness {
        _dir: dir,
        store,
        submitter,
        events,
        observer: Arc::new(NetworkObserver::new(broadcaster, handle)),
    }
}

#[tokio::test]
async fn starts_offline() {
    let h = harness();
    assert!(!h.observer.is_online());
    assert!(!*h.observer.subscribe().borrow());
}

#[tokio::test]
async fn transitions_follow_reports() {
    let h = harness();
    assert_eq!(h.observer.report(false).await, Transition::Unchanged);
    assert_eq!(h.observer.report(true).await, Transition::WentOnline);
    assert_eq!(h.observer.report(true).await, Transition::Unchanged);
    assert_eq!(h.observer.report(false).await, Transition::WentOffline);
    assert!(!h.observer.is_online());
}

#[tokio::test]
async fn every_change_is_broadcast() {
    let mut h = harness();
    h.observer.report(true).await;
    h.observer.report(true).await;
    h.observer.report(false).await;

    let mut seen = Vec::new();
    while let Ok(message) = h.events.try_recv() {
        if let BackgroundMessage::NetworkChanged { online } = message {
            seen.push(online);
        }
    }
    assert_eq!(seen, vec![true, false]);
}

#[tokio::test]
async fn reconnect_drains_the_queue() {
    let mut h = harness();
    let id = h
        .store
        .enqueue(OperationType::QuestCompletion, serde_json::json!({"questId": "q9"}))
        .unwrap();

    h.observer.report(true).await;

    loop {
        if let BackgroundMessage::SyncCompleted { results } = h.events.recv().await.unwrap() {
            assert_eq!(results.len(), 1);
            assert!(results[0].success);
            break;
        }
    }
    assert_eq!(h.submitter.submitted(), vec![id]);
    assert!(h.store.is_empty().unwrap());
}

#[tokio::test]
async fn going_offline_does_not_sync() {
    let mut h = harness();
    h.observer.report(true).await;
    // Drain the reconnect's sync.
    loop {
        if let BackgroundMessage::SyncCompleted { .. } = h.events.recv().await.unwrap() {
            break;
        }
    }

    h.store
        .enqueue(OperationType::MoodUpdate, serde_json::json!({}))
        .unwrap();
    h.observer.report(false).await;

    assert_eq!(
        h.events.recv().await.unwrap(),
        BackgroundMessage::network_changed(false)
    );
    assert!(h.events.try_recv().is_err());
    assert!(h.submitter.submitted().is_empty());
}

#[parameterized(
    explicit_port = { "http://api.example.test:8080/api", "api.example.test", 8080 },
    https_default = { "https://api.example.test/v1", "api.example.test", 443 },
    http_default = { "http://10.0.0.2", "10.0.0.2", 80 },
)]
fn probe_target_from_url(url: &str, host: &str, port: u16) {
    let target = ProbeTarget::from_url(&Url::parse(url).unwrap()).unwrap();
    assert_eq!(target.host, host);
    assert_eq!(target.port, port);
}

#[test]
fn probe_target_needs_a_host() {
    assert_eq!(ProbeTarget::from_url(&Url::parse("unix:/run/worker.sock").unwrap()), None);
}

#[tokio::test]
async fn probe_reports_reachability() {
    let h = harness();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let target = ProbeTarget {
        host: "127.0.0.1".into(),
        port: listener.local_addr().unwrap().port(),
    };
    let cancel = CancellationToken::new();
    let mut state = h.observer.subscribe();

    let task = spawn_probe(
        Arc::clone(&h.observer),
        target,
        Duration::from_millis(20),
        cancel.clone(),
    );

    tokio::time::timeout(Duration::from_secs(5), state.wait_for(|online| *online))
        .await
        .unwrap()
        .unwrap();

    drop(listener);
    tokio::time::timeout(Duration::from_secs(5), state.wait_for(|online| !*online))
        .await
        .unwrap()
        .unwrap();

    cancel.cancel();
    task.await.unwrap();
}

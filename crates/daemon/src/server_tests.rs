// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use super::*;
use crate::test_support::{FakeNetwork, ScriptedSubmitter};
use crate::worker::WorkerParts;
use ql_core::{Config, ManualClock, OperationType, PendingStore};
use ql_ipc::SOCKET_NAME;
use tempfile::{tempdir, TempDir};
use tokio::task::JoinHandle;

struct Harness {
    dir: TempDir,
    server: JoinHandle<()>,
}

async fn start() -> Harness {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.sync.wake_interval_secs = 0;
    config.sync.probe_interval_secs = 0;

    let parts = WorkerParts {
        submitter: ScriptedSubmitter::new(Ok(())),
        fetcher: FakeNetwork::offline(),
        clock: Arc::new(ManualClock::new(1_700_000_000_000)),
    };
    let worker = Arc::new(Worker::start(dir.path(), &config, parts).await.unwrap());
    let listener = bind(&dir.path().join(SOCKET_NAME)).unwrap();
    let server = tokio::spawn(run(listener, worker));
    Harness { dir, server }
}

impl Harness {
    async fn connect(&self) -> UnixStream {
        UnixStream::connect(self.dir.path().join(SOCKET_NAME))
            .await
            .unwrap()
    }
}

async fn send(stream: &mut UnixStream, request: &ForegroundRequest) {
    framing_async::write_message(stream, request).await.unwrap();
}

async fn recv(stream: &mut UnixStream) -> Option<WorkerResponse> {
    tokio::time::timeout(Duration::from_secs(5), framing_async::read_message(stream))
        .await
        .unwrap()
        .unwrap()
}

async fn call(stream: &mut UnixStream, request: ForegroundRequest) -> WorkerResponse {
    send(stream, &request).await;
    recv(stream).await.unwrap()
}

#[tokio::test]
async fn answers_several_requests_on_one_connection() {
    let h = start().await;
    let mut conn = h.connect().await;

    assert_eq!(call(&mut conn, ForegroundRequest::Ping).await, WorkerResponse::Pong);
    match call(&mut conn, ForegroundRequest::Status).await {
        WorkerResponse::Status(status) => {
            assert!(status.cache_active);
            assert_eq!(status.sync.pending_count, 0);
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

#[tokio::test]
async fn bind_replaces_a_stale_socket_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(SOCKET_NAME);
    std::fs::write(&path, "stale").unwrap();
    assert!(bind(&path).is_ok());
}

#[tokio::test]
async fn subscribers_receive_broadcasts() {
    let h = start().await;
    let mut watcher = h.connect().await;
    assert_eq!(
        call(&mut watcher, ForegroundRequest::Subscribe).await,
        WorkerResponse::Subscribed
    );

    PendingStore::open(h.dir.path())
        .unwrap()
        .enqueue(OperationType::QuestCompletion, serde_json::json!({"questId": "q1"}))
        .unwrap();

    let mut actor = h.connect().await;
    assert_eq!(
        call(&mut actor, ForegroundRequest::NetworkChanged { online: true }).await,
        WorkerResponse::Ack
    );

    let mut seen = Vec::new();
    while let Some(WorkerResponse::Event { message }) = recv(&mut watcher).await {
        let done = matches!(message, BackgroundMessage::SyncCompleted { .. });
        seen.push(message);
        if done {
            break;
        }
    }

    assert_eq!(seen[0], BackgroundMessage::network_changed(true));
    assert_eq!(seen[1], BackgroundMessage::SyncStarted);
    match &seen[2] {
        BackgroundMessage::SyncCompleted { results } => {
            assert_eq!(results.len(), 1);
            assert!(results[0].success);
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[tokio::test]
async fn subscriber_can_still_make_requests() {
    let h = start().await;
    let mut conn = h.connect().await;
    call(&mut conn, ForegroundRequest::Subscribe).await;

    assert_eq!(
        call(&mut conn, ForegroundRequest::RequestSync).await,
        WorkerResponse::SyncAccepted { started: true }
    );
    assert_eq!(
        recv(&mut conn).await,
        Some(WorkerResponse::Event {
            message: BackgroundMessage::SyncStarted
        })
    );
}

#[tokio::test]
async fn shutdown_stops_the_server_and_closes_subscribers() {
    let h = start().await;
    let mut watcher = h.connect().await;
    call(&mut watcher, ForegroundRequest::Subscribe).await;

    let mut conn = h.connect().await;
    assert_eq!(
        call(&mut conn, ForegroundRequest::Shutdown).await,
        WorkerResponse::ShuttingDown
    );

    tokio::time::timeout(Duration::from_secs(5), h.server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recv(&mut watcher).await, None);
}

#[tokio::test]
async fn garbage_frame_closes_only_that_connection() {
    use tokio::io::AsyncWriteExt;

    let h = start().await;
    let mut bad = h.connect().await;
    let body = b"not json";
    bad.write_all(&(body.len() as u32).to_be_bytes()).await.unwrap();
    bad.write_all(body).await.unwrap();
    assert_eq!(recv(&mut bad).await, None);

    let mut good = h.connect().await;
    assert_eq!(call(&mut good, ForegroundRequest::Ping).await, WorkerResponse::Pong);
}

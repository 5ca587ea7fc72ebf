// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::worker::test_support::FakeWorker;
use ql_core::{SyncResult, SyncStatus};
use ql_ipc::{ResponseSource, SOCKET_NAME};
use tempfile::tempdir;

fn status() -> WorkerStatus {
    WorkerStatus {
        pid: 4242,
        uptime_secs: 7,
        sync: SyncStatus::default(),
        online: true,
        cache_namespace: "questline-cache-v1".into(),
        cache_active: true,
        wake_supported: false,
    }
}

#[test]
fn connect_fails_without_a_worker() {
    let dir = tempdir().unwrap();
    let err = WorkerClient::connect(&dir.path().join(SOCKET_NAME)).err().unwrap();
    assert!(matches!(err, Error::Worker(_)));
}

#[test]
fn simple_requests_round_trip() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join(SOCKET_NAME);
    let fake = FakeWorker::spawn(&socket, |request| {
        vec![match request {
            ForegroundRequest::Ping => WorkerResponse::Pong,
            ForegroundRequest::Status => WorkerResponse::Status(status()),
            ForegroundRequest::RequestSync => WorkerResponse::SyncAccepted { started: false },
            ForegroundRequest::NetworkChanged { .. } => WorkerResponse::Ack,
            ForegroundRequest::Shutdown => WorkerResponse::ShuttingDown,
            _ => WorkerResponse::Error {
                message: "unsupported".into(),
            },
        }]
    });

    let mut client = WorkerClient::connect(&socket).unwrap();
    client.ping().unwrap();
    assert_eq!(client.status().unwrap().pid, 4242);
    assert!(!client.request_sync().unwrap());
    client.network_changed(false).unwrap();
    client.shutdown().unwrap();

    assert_eq!(
        fake.received(),
        vec![
            ForegroundRequest::Ping,
            ForegroundRequest::Status,
            ForegroundRequest::RequestSync,
            ForegroundRequest::NetworkChanged { online: false },
            ForegroundRequest::Shutdown,
        ]
    );
}

#[test]
fn error_response_becomes_worker_error() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join(SOCKET_NAME);
    let _fake = FakeWorker::spawn(&socket, |_| {
        vec![WorkerResponse::Error {
            message: "origin unreachable".into(),
        }]
    });

    let mut client = WorkerClient::connect(&socket).unwrap();
    let err = client.fetch(FetchRequest::get("/app.js")).unwrap_err();
    assert_eq!(err.to_string(), "worker error: origin unreachable");
}

#[test]
fn mismatched_response_is_unexpected() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join(SOCKET_NAME);
    let _fake = FakeWorker::spawn(&socket, |_| vec![WorkerResponse::Ack]);

    let mut client = WorkerClient::connect(&socket).unwrap();
    assert!(matches!(client.ping(), Err(Error::UnexpectedResponse(_))));
}

#[test]
fn hello_checks_the_version() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join(SOCKET_NAME);
    let _fake = FakeWorker::spawn(&socket, |_| {
        vec![WorkerResponse::Hello {
            version: "99.0.0".into(),
        }]
    });

    let mut client = WorkerClient::connect(&socket).unwrap();
    match client.hello() {
        Err(Error::WorkerVersionMismatch {
            worker_version,
            cli_version,
        }) => {
            assert_eq!(worker_version, "99.0.0");
            assert_eq!(cli_version, CLI_VERSION);
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn wake_reports_ignored_tags() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join(SOCKET_NAME);
    let _fake = FakeWorker::spawn(&socket, |request| match request {
        ForegroundRequest::Wake { tag } if tag == "sync-quest-completions" => {
            vec![WorkerResponse::SyncAccepted { started: true }]
        }
        _ => vec![WorkerResponse::Ack],
    });

    let mut client = WorkerClient::connect(&socket).unwrap();
    assert_eq!(client.wake("sync-quest-completions").unwrap(), Some(true));
    assert_eq!(client.wake("other").unwrap(), None);
}

#[test]
fn fetch_returns_the_response() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join(SOCKET_NAME);
    let _fake = FakeWorker::spawn(&socket, |_| {
        vec![WorkerResponse::Fetched {
            response: FetchResponse {
                status: 200,
                content_type: Some("text/html".into()),
                body: b"<html></html>".to_vec(),
                source: ResponseSource::Cache,
            },
        }]
    });

    let mut client = WorkerClient::connect(&socket).unwrap();
    let response = client.fetch(FetchRequest::navigation("/")).unwrap();
    assert_eq!(response.source, ResponseSource::Cache);
    assert_eq!(response.body, b"<html></html>");
}

#[test]
fn subscription_yields_events_until_hangup() {
    let dir = tempdir().unwrap();
    let socket = dir.path().join(SOCKET_NAME);
    let _fake = FakeWorker::spawn(&socket, |request| match request {
        ForegroundRequest::Subscribe => vec![
            WorkerResponse::Subscribed,
            WorkerResponse::Event {
                message: BackgroundMessage::SyncStarted,
            },
            WorkerResponse::Event {
                message: BackgroundMessage::sync_completed(vec![SyncResult::ok("op-1")]),
            },
        ],
        _ => vec![],
    });

    let subscription = WorkerClient::connect(&socket).unwrap().subscribe().unwrap();
    let messages: Vec<BackgroundMessage> = subscription.take(2).map(|m| m.unwrap()).collect();

    assert_eq!(messages[0], BackgroundMessage::SyncStarted);
    assert_eq!(messages[1].success_count(), 1);
}

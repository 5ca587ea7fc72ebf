// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use ql_core::SyncResult;

#[test]
fn send_without_subscribers_is_not_an_error() {
    let broadcaster = StatusBroadcaster::default();
    assert_eq!(broadcaster.send(BackgroundMessage::SyncStarted), 0);
}

#[tokio::test]
async fn every_subscriber_receives_each_message_once() {
    let broadcaster = StatusBroadcaster::default();
    let mut a = broadcaster.subscribe();
    let mut b = broadcaster.subscribe();
    assert_eq!(broadcaster.subscriber_count(), 2);

    let msg = BackgroundMessage::sync_completed(vec![SyncResult::ok("op-1")]);
    assert_eq!(broadcaster.send(msg.clone()), 2);

    assert_eq!(a.recv().await.unwrap(), msg);
    assert_eq!(b.recv().await.unwrap(), msg);
    assert!(a.try_recv().is_err());
}

#[tokio::test]
async fn late_subscriber_misses_earlier_messages() {
    let broadcaster = StatusBroadcaster::default();
    broadcaster.send(BackgroundMessage::SyncStarted);

    let mut late = broadcaster.subscribe();
    broadcaster.send(BackgroundMessage::network_changed(true));
    assert_eq!(late.recv().await.unwrap(), BackgroundMessage::network_changed(true));
}

#[tokio::test]
async fn dropped_subscriber_is_not_counted() {
    let broadcaster = StatusBroadcaster::default();
    let rx = broadcaster.subscribe();
    drop(rx);
    assert_eq!(broadcaster.send(BackgroundMessage::SyncStarted), 0);
}

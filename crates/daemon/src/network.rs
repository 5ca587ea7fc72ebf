// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network status observer.
//!
//! Tracks Online/Offline for the background context. It starts Offline, so
//! the first positive report counts as a reconnect and drains anything
//! queued while the worker was down.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ql_core::BackgroundMessage;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::broadcast::StatusBroadcaster;
use crate::sync::{CoordinatorHandle, SyncTrigger};

/// Result of a connectivity report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    WentOnline,
    WentOffline,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Unchanged => write!(f, "unchanged"),
            Transition::WentOnline => write!(f, "online"),
            Transition::WentOffline => write!(f, "offline"),
        }
    }
}

/// Owns the connectivity state and reacts to changes.
pub struct NetworkObserver {
    state: watch::Sender<bool>,
    broadcaster: StatusBroadcaster,
    coordinator: CoordinatorHandle,
}

impl NetworkObserver {
    /// Creates an observer in the Offline state.
    pub fn new(broadcaster: StatusBroadcaster, coordinator: CoordinatorHandle) -> Self {
        let (state, _) = watch::channel(false);
        NetworkObserver {
            state,
            broadcaster,
            coordinator,
        }
    }

    /// Current state.
    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// A receiver that sees every state change.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Feeds an observation into the state machine.
    ///
    /// Every change is broadcast. Going online also asks the coordinator for
    /// a drain; going offline only updates the state.
    pub async fn report(&self, online: bool) -> Transition {
        let changed = self.state.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if !changed {
            return Transition::Unchanged;
        }

        let transition = if online {
            Transition::WentOnline
        } else {
            Transition::WentOffline
        };
        tracing::info!(%transition, "network state changed");
        self.broadcaster
            .send(BackgroundMessage::network_changed(online));

        if transition == Transition::WentOnline {
            if let Err(e) = self.coordinator.trigger(SyncTrigger::Reconnected).await {
                tracing::warn!("could not trigger sync after reconnect: {}", e);
            }
        }
        transition
    }
}

/// Host and port checked by the reachability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
}

impl ProbeTarget {
    /// Derives the target from the API base URL.
    pub fn from_url(url: &Url) -> Option<Self> {
        Some(ProbeTarget {
            host: url.host_str()?.to_string(),
            port: url.port_or_known_default()?,
        })
    }

    /// Attempts one TCP connection within `timeout`.
    pub async fn reachable(&self, timeout: Duration) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        matches!(tokio::time::timeout(timeout, connect).await, Ok(Ok(_)))
    }
}

/// Periodically probes `target` and reports the result until cancelled.
pub fn spawn_probe(
    observer: Arc<NetworkObserver>,
    target: ProbeTarget,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::debug!(host = %target.host, port = target.port, "starting reachability probe");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let online = target.reachable(interval).await;
                    observer.report(online).await;
                }
            }
        }
        tracing::debug!("reachability probe stopped");
    })
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;

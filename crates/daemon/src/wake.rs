// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background wake.
//!
//! One well-known tag wakes the coordinator. The periodic timer is optional;
//! when it is not configured, wakes only arrive on demand over IPC.

use std::time::Duration;

use ql_core::SyncConfig;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::sync::{CoordinatorHandle, SyncTrigger, TriggerOutcome};

/// The wake registration for the sync tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundWake {
    tag: String,
    interval: Option<Duration>,
}

impl BackgroundWake {
    pub fn new(tag: impl Into<String>, interval: Option<Duration>) -> Self {
        BackgroundWake {
            tag: tag.into(),
            interval: interval.filter(|d| !d.is_zero()),
        }
    }

    pub fn from_config(sync: &SyncConfig) -> Self {
        Self::new(
            sync.wake_tag.clone(),
            Some(Duration::from_secs(sync.wake_interval_secs)),
        )
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether periodic wake is available. Absence is not an error.
    pub fn probe(&self) -> bool {
        self.interval.is_some()
    }

    /// Delivers a wake event. Returns `None` for tags other than ours.
    pub async fn deliver(
        &self,
        tag: &str,
        coordinator: &CoordinatorHandle,
    ) -> Option<TriggerOutcome> {
        if tag != self.tag {
            tracing::debug!(tag, "ignoring wake for unknown tag");
            return None;
        }
        let trigger = SyncTrigger::BackgroundWake {
            tag: self.tag.clone(),
        };
        match coordinator.trigger(trigger).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!("wake could not reach the coordinator: {}", e);
                None
            }
        }
    }

    /// Fires the wake on every interval until cancelled. `None` when
    /// periodic wake is unsupported.
    pub fn spawn_periodic(
        &self,
        coordinator: CoordinatorHandle,
        cancel: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        let interval = self.interval?;
        let wake = self.clone();
        Some(tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        tracing::debug!(tag = %wake.tag, "periodic wake");
                        wake.deliver(&wake.tag, &coordinator).await;
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
#[path = "wake_tests.rs"]
mod tests;

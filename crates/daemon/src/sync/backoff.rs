// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-operation retry bookkeeping.
//!
//! Failed operations stay queued. Each failure pushes the operation's next
//! eligible time out exponentially (with jitter) up to a cap, and after
//! `max_attempts` failures the operation is dead-lettered. All of this lives
//! in memory; the persisted queue record never changes.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use ql_core::SyncConfig;
use sha2::{Digest, Sha256};

/// Backoff and dead-letter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay after the first failure. Zero disables backoff.
    pub initial: Duration,
    /// Cap on the delay.
    pub max: Duration,
    /// Failures before dead-lettering. Zero means never.
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Builds the policy from the sync settings.
    pub fn from_config(config: &SyncConfig) -> Self {
        RetryPolicy {
            initial: Duration::from_millis(config.backoff_initial_ms),
            max: Duration::from_secs(config.backoff_max_secs),
            max_attempts: config.max_attempts,
        }
    }

    /// Retry on every trigger, never give up.
    pub fn immediate() -> Self {
        RetryPolicy {
            initial: Duration::ZERO,
            max: Duration::ZERO,
            max_attempts: 0,
        }
    }

    /// Delay before retrying after the `attempts`-th failure.
    ///
    /// Exponential with a cap, then jittered into `[delay/2, delay]` by a
    /// hash of the operation id and attempt so retries spread out but stay
    /// reproducible.
    pub fn delay_for(&self, id: &str, attempts: u32) -> Duration {
        if self.initial.is_zero() || attempts == 0 {
            return Duration::ZERO;
        }

        let initial_ms = self.initial.as_millis() as u64;
        let max_ms = (self.max.as_millis() as u64).max(initial_ms);
        let shift = (attempts - 1).min(32);
        let base_ms = initial_ms.saturating_mul(1u64 << shift).min(max_ms);

        let half = base_ms / 2;
        let jitter = if half == 0 { 0 } else { jitter_seed(id, attempts) % (half + 1) };
        Duration::from_millis(base_ms - half + jitter)
    }

    /// Whether an operation with this many failures should be dead-lettered.
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts > 0 && attempts >= self.max_attempts
    }
}

fn jitter_seed(id: &str, attempts: u32) -> u64 {
    let digest = Sha256::new()
        .chain_update(id.as_bytes())
        .chain_update(attempts.to_be_bytes())
        .finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RetryState {
    attempts: u32,
    next_eligible_ms: u64,
    dead_lettered: bool,
}

/// Failure counts and retry windows keyed by operation id.
///
/// Owned by value: the coordinator hands it to a drain and gets it back with
/// the drain's results.
#[derive(Debug, Clone, Default)]
pub struct RetryTracker {
    entries: HashMap<String, RetryState>,
}

impl RetryTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the operation may be submitted at `now_ms`.
    pub fn is_eligible(&self, id: &str, now_ms: u64) -> bool {
        self.entries
            .get(id)
            .is_none_or(|state| now_ms >= state.next_eligible_ms)
    }

    /// Failures recorded for the operation.
    pub fn attempts(&self, id: &str) -> u32 {
        self.entries.get(id).map_or(0, |state| state.attempts)
    }

    /// Records a failure and returns the new failure count.
    pub fn record_failure(&mut self, id: &str, now_ms: u64, policy: &RetryPolicy) -> u32 {
        let state = self.entries.entry(id.to_string()).or_insert(RetryState {
            attempts: 0,
            next_eligible_ms: 0,
            dead_lettered: false,
        });
        state.attempts = state.attempts.saturating_add(1);
        let delay = policy.delay_for(id, state.attempts);
        state.next_eligible_ms = now_ms.saturating_add(delay.as_millis() as u64);
        state.attempts
    }

    /// Marks an operation whose dead letter was written but which is still
    /// queued. Later drains only retry the removal.
    pub fn mark_dead_lettered(&mut self, id: &str) {
        if let Some(state) = self.entries.get_mut(id) {
            state.dead_lettered = true;
        }
    }

    /// Whether the operation already has a dead letter.
    pub fn is_dead_lettered(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(|state| state.dead_lettered)
    }

    /// Drops all bookkeeping for the operation.
    pub fn forget(&mut self, id: &str) {
        self.entries.remove(id);
    }

    /// Drops entries for operations no longer queued.
    pub fn retain_queued(&mut self, queued: &HashSet<&str>) {
        self.entries.retain(|id, _| queued.contains(id.as_str()));
    }

    /// Number of operations with recorded failures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no failures are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;

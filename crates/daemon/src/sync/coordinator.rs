// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync coordinator actor.
//!
//! One task owns the drain state. Everything else talks to it through a
//! [`CoordinatorHandle`]: triggers and refreshes go in over an mpsc channel,
//! replies come back on oneshots, and the current [`SyncStatus`] is published
//! on a watch channel.
//!
//! A drain runs in its own task so the actor keeps answering while
//! submissions are in flight. The drain takes the retry tracker by value and
//! hands it back together with the results; while it is away the actor knows
//! a drain is running and drops further triggers.

use std::collections::HashSet;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use futures_util::FutureExt;
use ql_core::{
    jsonl, BackgroundMessage, ClockSource, PendingOperation, PendingStore, SubmitError,
    SubmitResult, Submitter, SyncConfig, SyncResult, SyncStatus,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::backoff::{RetryPolicy, RetryTracker};
use crate::broadcast::StatusBroadcaster;
use crate::error::{Error, Result};

/// File receiving operations that exhausted their attempts.
pub const DEAD_LETTER_FILE: &str = "dead_letter.jsonl";

/// What asked for a drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTrigger {
    /// The network observer saw Offline -> Online.
    Reconnected,
    /// A background wake fired for the sync tag.
    BackgroundWake { tag: String },
    /// A foreground context asked, usually right after an enqueue.
    Requested,
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncTrigger::Reconnected => write!(f, "reconnected"),
            SyncTrigger::BackgroundWake { tag } => write!(f, "wake:{}", tag),
            SyncTrigger::Requested => write!(f, "requested"),
        }
    }
}

/// Reply to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A drain was started.
    Started,
    /// A drain was already running; the trigger was dropped.
    AlreadySyncing,
}

/// Drain settings.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Backoff and dead-letter policy.
    pub policy: RetryPolicy,
    /// Per-submission timeout; `None` waits indefinitely.
    pub submit_timeout: Option<Duration>,
    /// Where dead-lettered operations are appended.
    pub dead_letter_path: PathBuf,
}

impl CoordinatorConfig {
    /// Builds the drain settings for a state directory.
    pub fn from_config(sync: &SyncConfig, state_dir: &Path) -> Self {
        CoordinatorConfig {
            policy: RetryPolicy::from_config(sync),
            submit_timeout: (sync.submit_timeout_secs > 0)
                .then(|| Duration::from_secs(sync.submit_timeout_secs)),
            dead_letter_path: state_dir.join(DEAD_LETTER_FILE),
        }
    }
}

/// A dead-lettered operation with the reason it was given up on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetter {
    /// The original queue record.
    #[serde(flatten)]
    pub operation: PendingOperation,
    /// Failures before it was moved.
    pub attempts: u32,
    /// The last failure.
    pub error: String,
    /// When it was moved.
    pub dead_at: DateTime<Utc>,
}

enum Command {
    Trigger {
        trigger: SyncTrigger,
        reply: oneshot::Sender<TriggerOutcome>,
    },
    Refresh {
        reply: oneshot::Sender<SyncStatus>,
    },
}

struct DrainReport {
    results: Vec<SyncResult>,
    tracker: RetryTracker,
}

/// Everything a drain needs, shared read-only with the drain task.
struct DrainContext {
    store: PendingStore,
    submitter: Arc<dyn Submitter>,
    clock: Arc<dyn ClockSource>,
    config: CoordinatorConfig,
}

impl DrainContext {
    /// Runs file work on the blocking pool. The queue lock can be held by a
    /// foreground process for as long as it likes.
    async fn blocking<T, F>(self: &Arc<Self>, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&DrainContext) -> ql_core::Result<T> + Send + 'static,
    {
        let ctx = Arc::clone(self);
        match tokio::task::spawn_blocking(move || f(&ctx)).await {
            Ok(result) => Ok(result?),
            Err(e) => Err(Error::Io(std::io::Error::other(e))),
        }
    }

    async fn count(self: &Arc<Self>) -> Result<usize> {
        self.blocking(|ctx| ctx.store.count()).await
    }

    async fn remove(self: &Arc<Self>, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.blocking(move |ctx| ctx.store.remove(&id)).await
    }
}

/// Handle to the coordinator actor.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Command>,
    status_rx: watch::Receiver<SyncStatus>,
}

impl CoordinatorHandle {
    /// Asks for a drain.
    pub async fn trigger(&self, trigger: SyncTrigger) -> Result<TriggerOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Trigger { trigger, reply })
            .await
            .map_err(|_| Error::ShuttingDown)?;
        rx.await.map_err(|_| Error::ShuttingDown)
    }

    /// Re-reads the pending count from the store and returns the status.
    pub async fn refresh(&self) -> Result<SyncStatus> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Refresh { reply })
            .await
            .map_err(|_| Error::ShuttingDown)?;
        rx.await.map_err(|_| Error::ShuttingDown)
    }

    /// Last published status.
    pub fn status(&self) -> SyncStatus {
        self.status_rx.borrow().clone()
    }

    /// A receiver that sees every status change.
    pub fn watch(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }
}

/// The actor. Construct with [`Coordinator::spawn`].
pub struct Coordinator {
    ctx: Arc<DrainContext>,
    broadcaster: StatusBroadcaster,
    status: SyncStatus,
    status_tx: watch::Sender<SyncStatus>,
    tracker: Option<RetryTracker>,
    commands: mpsc::Receiver<Command>,
    done_tx: mpsc::Sender<DrainReport>,
    done_rx: mpsc::Receiver<DrainReport>,
}

impl Coordinator {
    /// Loads the initial status from the store and starts the actor task.
    ///
    /// The task exits once every handle is dropped and any running drain has
    /// reported.
    pub fn spawn(
        store: PendingStore,
        submitter: Arc<dyn Submitter>,
        broadcaster: StatusBroadcaster,
        clock: Arc<dyn ClockSource>,
        config: CoordinatorConfig,
    ) -> Result<(CoordinatorHandle, JoinHandle<()>)> {
        let status = SyncStatus::load(&store)?;
        let (status_tx, status_rx) = watch::channel(status.clone());
        let (tx, commands) = mpsc::channel(32);
        let (done_tx, done_rx) = mpsc::channel(1);

        let coordinator = Coordinator {
            ctx: Arc::new(DrainContext {
                store,
                submitter,
                clock,
                config,
            }),
            broadcaster,
            status,
            status_tx,
            tracker: Some(RetryTracker::new()),
            commands,
            done_tx,
            done_rx,
        };

        let task = tokio::spawn(coordinator.run());
        Ok((CoordinatorHandle { tx, status_rx }, task))
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                Some(report) = self.done_rx.recv() => self.finish_drain(report).await,
            }
        }

        if self.tracker.is_none() {
            if let Some(report) = self.done_rx.recv().await {
                self.finish_drain(report).await;
            }
        }
        tracing::debug!("sync coordinator stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Trigger { trigger, reply } => {
                let outcome = self.start_drain(trigger).await;
                let _ = reply.send(outcome);
            }
            Command::Refresh { reply } => {
                self.recount().await;
                self.publish();
                let _ = reply.send(self.status.clone());
            }
        }
    }

    /// Re-reads the pending count; other contexts enqueue behind our back.
    async fn recount(&mut self) {
        match self.ctx.count().await {
            Ok(pending) => self.status.pending_count = pending,
            Err(e) => tracing::warn!("failed to count pending operations: {}", e),
        }
    }

    async fn start_drain(&mut self, trigger: SyncTrigger) -> TriggerOutcome {
        let Some(tracker) = self.tracker.take() else {
            tracing::debug!(%trigger, "drain already running, ignoring trigger");
            return TriggerOutcome::AlreadySyncing;
        };

        tracing::info!(%trigger, "starting drain");
        self.recount().await;
        self.status.begin_drain();
        self.publish();
        self.broadcaster.send(BackgroundMessage::SyncStarted);

        let ctx = Arc::clone(&self.ctx);
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            let report = match tokio::spawn(drain(ctx, tracker)).await {
                Ok(report) => report,
                Err(e) => {
                    // Retry bookkeeping went down with the task.
                    tracing::error!("drain task failed: {}", e);
                    DrainReport {
                        results: Vec::new(),
                        tracker: RetryTracker::new(),
                    }
                }
            };
            let _ = done.send(report).await;
        });

        TriggerOutcome::Started
    }

    async fn finish_drain(&mut self, report: DrainReport) {
        let succeeded = report.results.iter().filter(|r| r.success).count();
        let pending = match self.ctx.count().await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("failed to count pending operations: {}", e);
                self.status.pending_count.saturating_sub(succeeded)
            }
        };

        self.status
            .complete_drain(&report.results, self.ctx.clock.now(), pending);
        self.tracker = Some(report.tracker);
        self.publish();

        tracing::info!(
            submitted = report.results.len(),
            succeeded,
            pending,
            "drain finished"
        );
        self.broadcaster
            .send(BackgroundMessage::sync_completed(report.results));
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.status.clone());
    }
}

/// One drain: snapshot, submit concurrently, remove each success at once.
async fn drain(ctx: Arc<DrainContext>, mut tracker: RetryTracker) -> DrainReport {
    let snapshot = match ctx.blocking(|ctx| ctx.store.list()).await {
        Ok(ops) => ops,
        Err(e) => {
            tracing::error!("failed to read pending operations: {}", e);
            return DrainReport {
                results: Vec::new(),
                tracker,
            };
        }
    };

    {
        let queued: HashSet<&str> = snapshot.iter().map(|op| op.id.as_str()).collect();
        tracker.retain_queued(&queued);
    }

    // Already in the dead letter file; only the removal is outstanding.
    let (stranded, snapshot): (Vec<_>, Vec<_>) = snapshot
        .into_iter()
        .partition(|op| tracker.is_dead_lettered(&op.id));
    for op in &stranded {
        match ctx.remove(&op.id).await {
            Ok(_) => tracker.forget(&op.id),
            Err(e) => tracing::error!(id = %op.id, "dead-lettered operation could not be removed: {}", e),
        }
    }

    let now_ms = ctx.clock.now_ms();
    let (eligible, deferred): (Vec<_>, Vec<_>) = snapshot
        .into_iter()
        .partition(|op| tracker.is_eligible(&op.id, now_ms));
    if !deferred.is_empty() {
        tracing::debug!(
            deferred = deferred.len(),
            "skipping operations inside their retry window"
        );
    }

    let outcomes = join_all(eligible.iter().map(|op| submit_one(&ctx, op))).await;

    let mut results = Vec::with_capacity(eligible.len());
    for (op, outcome) in eligible.iter().zip(outcomes) {
        match outcome {
            Ok(()) => {
                tracker.forget(&op.id);
                results.push(SyncResult::ok(&op.id));
            }
            Err(e) => {
                let attempts = tracker.record_failure(&op.id, ctx.clock.now_ms(), &ctx.config.policy);
                tracing::warn!(id = %op.id, attempts, "submission failed: {}", e);
                if !ctx.config.policy.exhausted(attempts) {
                    results.push(SyncResult::failed(&op.id, e.to_string()));
                    continue;
                }
                let (result, moved) = dead_letter(&ctx, op, attempts, &e).await;
                match moved {
                    DeadLetterOutcome::Moved => tracker.forget(&op.id),
                    DeadLetterOutcome::Stranded => tracker.mark_dead_lettered(&op.id),
                    DeadLetterOutcome::Kept => {}
                }
                results.push(result);
            }
        }
    }

    DrainReport { results, tracker }
}

/// Submits one operation and removes it as soon as it is acknowledged.
///
/// A panicking submitter counts as a transient failure.
async fn submit_one(ctx: &Arc<DrainContext>, op: &PendingOperation) -> SubmitResult {
    let submission = AssertUnwindSafe(ctx.submitter.submit(op)).catch_unwind();
    let joined = match ctx.config.submit_timeout {
        Some(limit) => match tokio::time::timeout(limit, submission).await {
            Ok(joined) => joined,
            Err(_) => {
                return Err(SubmitError::Transient(format!(
                    "timed out after {}ms",
                    limit.as_millis()
                )))
            }
        },
        None => submission.await,
    };
    let outcome = match joined {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(id = %op.id, "submitter panicked");
            Err(SubmitError::Transient("submission panicked".to_string()))
        }
    };

    if outcome.is_ok() {
        match ctx.remove(&op.id).await {
            Ok(_) => tracing::debug!(id = %op.id, "operation acknowledged"),
            // The Idempotency-Key makes a later resubmit harmless.
            Err(e) => tracing::error!(
                id = %op.id,
                "acknowledged operation could not be removed: {}",
                e
            ),
        }
    }
    outcome
}

/// Where a dead-lettered operation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeadLetterOutcome {
    /// Written to the dead letter file and removed from the queue.
    Moved,
    /// Written to the dead letter file but still queued.
    Stranded,
    /// The dead letter file could not be written; still queued.
    Kept,
}

/// Moves an exhausted operation out of the queue. Keeps it queued if the
/// dead letter file cannot be written.
async fn dead_letter(
    ctx: &Arc<DrainContext>,
    op: &PendingOperation,
    attempts: u32,
    err: &SubmitError,
) -> (SyncResult, DeadLetterOutcome) {
    let record = DeadLetter {
        operation: op.clone(),
        attempts,
        error: err.to_string(),
        dead_at: ctx.clock.now(),
    };

    let written = ctx
        .blocking(move |ctx| jsonl::append(&ctx.config.dead_letter_path, &record))
        .await;
    if let Err(e) = written {
        tracing::error!(id = %op.id, "failed to write dead letter, keeping operation: {}", e);
        return (
            SyncResult::failed(&op.id, err.to_string()),
            DeadLetterOutcome::Kept,
        );
    }

    let outcome = match ctx.remove(&op.id).await {
        Ok(_) => DeadLetterOutcome::Moved,
        Err(e) => {
            tracing::error!(id = %op.id, "dead-lettered operation could not be removed: {}", e);
            DeadLetterOutcome::Stranded
        }
    };

    tracing::warn!(id = %op.id, attempts, "operation moved to dead letter");
    let result = SyncResult::failed(
        &op.id,
        format!("dead-lettered after {} attempts: {}", attempts, err),
    );
    (result, outcome)
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;

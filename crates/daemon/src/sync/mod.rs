// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Draining the pending store against the remote API.
//!
//! ```text
//! triggers ──► CoordinatorHandle ──mpsc──► Coordinator (actor)
//!                                              │ spawn
//!                                              ▼
//!                                     drain: list → submit* → remove
//!                                              │ results + tracker
//!                                              ▼
//!                              SyncStatus (watch) + StatusBroadcaster
//! ```

mod backoff;
mod coordinator;

pub use backoff::{RetryPolicy, RetryTracker};
pub use coordinator::{
    Coordinator, CoordinatorConfig, CoordinatorHandle, DeadLetter, SyncTrigger, TriggerOutcome,
    DEAD_LETTER_FILE,
};

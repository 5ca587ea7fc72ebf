// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ql-core: shared library for the questline sync layer.
//!
//! This crate holds everything both execution contexts touch: the pending
//! operation model and its durable store, the sync status both sides
//! recompute, the broadcast envelope, the submit contract, and configuration.
//! The foreground `ql` CLI and the background `questlined` worker both depend
//! on it.

pub mod clock;
pub mod config;
pub mod env;
pub mod error;
pub mod id;
pub mod jsonl;
pub mod operation;
pub mod protocol;
pub mod queue;
pub mod status;
pub mod submit;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use config::{CacheConfig, Config, SyncConfig};
pub use error::{Error, Result};
pub use operation::{OperationType, PendingOperation};
pub use protocol::{BackgroundMessage, SyncResult};
pub use queue::PendingStore;
pub use status::SyncStatus;
pub use submit::{HttpSubmitter, SubmitError, SubmitResult, Submitter};

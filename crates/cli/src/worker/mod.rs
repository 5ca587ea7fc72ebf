// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Talking to the questlined background worker.
//!
//! The worker runs as a separate process per state directory and answers
//! framed requests on a Unix socket. This module finds, spawns, and stops it,
//! and wraps the request/response protocol in a blocking client.

mod client;
mod lifecycle;

pub use client::{Subscription, WorkerClient, CLI_VERSION};
pub use lifecycle::{
    detect_worker, get_socket_path, get_worker_status, spawn_worker, stop_worker_forcefully,
    WorkerInfo,
};

#[cfg(test)]
mod test_support;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! questlined: the background execution context of the questline sync layer.
//!
//! The worker outlives foreground `ql` invocations. It owns the response
//! cache, drains the pending operation store against the remote API, tracks
//! connectivity, and broadcasts sync events to every subscribed foreground
//! context over a Unix socket.

pub mod broadcast;
pub mod cache;
pub mod error;
pub mod lifecycle;
pub mod network;
pub mod server;
pub mod sync;
pub mod wake;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
pub use worker::{Worker, WorkerParts};

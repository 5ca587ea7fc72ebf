// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fan-out of background messages to every subscribed foreground context.
//!
//! Delivery is at-most-once per open subscriber. A context that is not
//! subscribed when a message is sent never sees it and recomputes its state
//! from the pending store instead.

use ql_core::BackgroundMessage;
use tokio::sync::broadcast;

/// Buffered messages per subscriber before it starts lagging.
pub const DEFAULT_CAPACITY: usize = 256;

/// Broadcast channel for [`BackgroundMessage`]s.
#[derive(Debug, Clone)]
pub struct StatusBroadcaster {
    tx: broadcast::Sender<BackgroundMessage>,
}

impl StatusBroadcaster {
    /// Creates a broadcaster buffering `capacity` messages per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        StatusBroadcaster { tx }
    }

    /// Sends to every current subscriber. Returns how many received it.
    pub fn send(&self, message: BackgroundMessage) -> usize {
        match self.tx.send(message) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(message)) => {
                tracing::debug!(?message, "no open contexts to notify");
                0
            }
        }
    }

    /// Registers a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<BackgroundMessage> {
        self.tx.subscribe()
    }

    /// Number of open subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
#[path = "broadcast_tests.rs"]
mod tests;

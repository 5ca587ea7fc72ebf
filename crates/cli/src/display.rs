// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text rendering for pending operations, sync status, and events.

use chrono::{DateTime, SecondsFormat, Utc};
use ql_core::{BackgroundMessage, PendingOperation, SyncStatus};
use ql_ipc::WorkerStatus;

/// Format a timestamp for display, or "never".
pub fn format_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(t) => t.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => "never".to_string(),
    }
}

/// One line per pending operation: id, type, queued time, payload.
pub fn format_operation_line(op: &PendingOperation) -> String {
    format!(
        "{}  {}  {}  {}",
        op.id,
        op.operation_type,
        format_time(Some(op.created_at_utc())),
        op.payload
    )
}

/// Local sync status plus, when running, what the worker reports.
pub fn format_status(status: &SyncStatus, worker: Option<&WorkerStatus>) -> String {
    let mut lines = vec![
        format!("pending:          {}", status.pending_count),
        format!("syncing:          {}", if status.is_syncing { "yes" } else { "no" }),
        format!("last attempt:     {}", format_time(status.last_sync_attempt)),
        format!("last success:     {}", format_time(status.last_successful_sync)),
    ];

    match worker {
        Some(w) => {
            lines.push(format!(
                "worker:           running (pid {}, up {}s)",
                w.pid, w.uptime_secs
            ));
            lines.push(format!(
                "network:          {}",
                if w.online { "online" } else { "offline" }
            ));
            lines.push(format!(
                "cache:            {}{}",
                w.cache_namespace,
                if w.cache_active { "" } else { " (installing)" }
            ));
            lines.push(format!(
                "background wake:  {}",
                if w.wake_supported { "periodic" } else { "on demand only" }
            ));
        }
        None => lines.push("worker:           not running".to_string()),
    }

    lines.join("\n")
}

/// One or more lines describing a background message.
pub fn format_event(message: &BackgroundMessage) -> String {
    match message {
        BackgroundMessage::SyncStarted => "sync started".to_string(),
        BackgroundMessage::NetworkChanged { online } => {
            format!("network {}", if *online { "online" } else { "offline" })
        }
        BackgroundMessage::SyncCompleted { results } => {
            let succeeded = message.success_count();
            let mut out = format!(
                "sync completed: {} succeeded, {} failed",
                succeeded,
                results.len() - succeeded
            );
            for result in results {
                match &result.error {
                    None => out.push_str(&format!("\n  ok      {}", result.operation_id)),
                    Some(e) => out.push_str(&format!("\n  failed  {}: {}", result.operation_id, e)),
                }
            }
            out
        }
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;

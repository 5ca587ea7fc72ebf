// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ql_core::BackgroundMessage;

use super::connect_worker;
use crate::context::ForegroundContext;
use crate::display::format_event;
use crate::error::Result;

/// Prints background messages as they arrive, applying each to the local
/// sync status. Stops after `count` messages or when the worker goes away.
pub fn run(ctx: &mut ForegroundContext, count: Option<usize>) -> Result<()> {
    let client = connect_worker(ctx.state_dir())?;
    let subscription = client.subscribe()?;

    let limit = count.unwrap_or(usize::MAX);
    for message in subscription.take(limit) {
        let message = message?;
        ctx.apply(&message)?;
        println!("{}", format_event(&message));
        if matches!(message, BackgroundMessage::SyncCompleted { .. }) {
            println!("  pending: {}", ctx.status().pending_count);
        }
    }
    Ok(())
}

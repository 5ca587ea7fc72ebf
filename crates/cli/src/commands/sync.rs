// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Commands that nudge the background worker: sync, wake, network.

use super::connect_worker;
use crate::context::ForegroundContext;
use crate::error::Result;

/// Asks the worker to drain the pending store now.
pub fn sync(ctx: &ForegroundContext) -> Result<()> {
    let pending = ctx.status().pending_count;
    let mut client = connect_worker(ctx.state_dir())?;

    if client.request_sync()? {
        println!("sync started ({} pending)", pending);
    } else {
        println!("sync already in progress");
    }
    Ok(())
}

/// Delivers a background wake. Without a tag the configured one is used.
pub fn wake(ctx: &ForegroundContext, tag: Option<&str>) -> Result<()> {
    let tag = tag.unwrap_or(&ctx.config().sync.wake_tag);
    let mut client = connect_worker(ctx.state_dir())?;

    match client.wake(tag)? {
        Some(true) => println!("wake {}: sync started", tag),
        Some(false) => println!("wake {}: sync already in progress", tag),
        None => println!("wake {}: ignored (unknown tag)", tag),
    }
    Ok(())
}

/// Reports a connectivity change to the worker.
pub fn network(ctx: &ForegroundContext, online: bool) -> Result<()> {
    let mut client = connect_worker(ctx.state_dir())?;
    client.network_changed(online)?;
    println!(
        "reported network {}",
        if online { "online" } else { "offline" }
    );
    Ok(())
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! questline - the foreground side of the questline sync layer.
//!
//! This crate provides the functionality behind the `ql` CLI: submitting
//! mutations directly or through the durable pending store, inspecting the
//! queue and sync status, and talking to the `questlined` background worker.
//!
//! # Main Components
//!
//! - [`ForegroundContext`] - one open context: state directory, config,
//!   pending store and its local sync status
//! - [`worker`] - worker client and lifecycle (spawn, detect, stop)
//! - [`Error`] - Error types for all operations

mod cli;
mod commands;
mod display;

pub mod context;
pub mod error;
pub mod worker;

pub use cli::{Cli, Command, NetworkState, OutputFormat, WorkerCommand};
pub use context::ForegroundContext;
pub use error::{Error, Result};

/// Runs one parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let state_dir = ForegroundContext::resolve_state_dir(cli.state_dir)?;
    let mut ctx = ForegroundContext::open(&state_dir)?;

    match cli.command {
        Command::Submit {
            operation_type,
            payload,
            queue,
            output,
        } => commands::submit::run(&mut ctx, &operation_type, &payload, queue, output),
        Command::List { output } => commands::list::run(&ctx, output),
        Command::Status { output } => commands::status::run(&ctx, output),
        Command::Sync => commands::sync::sync(&ctx),
        Command::Wake { tag } => commands::sync::wake(&ctx, tag.as_deref()),
        Command::Network { state } => commands::sync::network(&ctx, state.is_online()),
        Command::Watch { count } => commands::watch::run(&mut ctx, count),
        Command::Fetch {
            url,
            navigate,
            image,
            method,
        } => commands::fetch::run(&ctx, &url, navigate, image, &method),
        Command::Worker(cmd) => match cmd {
            WorkerCommand::Start => commands::worker::start(ctx.state_dir()),
            WorkerCommand::Stop => commands::worker::stop(ctx.state_dir()),
            WorkerCommand::Status => commands::worker::status(ctx.state_dir()),
        },
    }
}

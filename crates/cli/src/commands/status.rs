// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ql_core::SyncStatus;
use ql_ipc::WorkerStatus;
use serde::Serialize;

use super::running_worker;
use crate::cli::OutputFormat;
use crate::context::ForegroundContext;
use crate::display::format_status;
use crate::error::Result;

#[derive(Serialize)]
struct StatusJson<'a> {
    sync: &'a SyncStatus,
    worker: Option<&'a WorkerStatus>,
}

/// Shows the sync status. A running worker's view wins over the local one,
/// since only the worker knows whether a drain is in flight.
pub fn run(ctx: &ForegroundContext, output: OutputFormat) -> Result<()> {
    let worker = running_worker(ctx.state_dir());
    let sync = worker.as_ref().map_or(ctx.status(), |w| &w.sync);

    match output {
        OutputFormat::Json => {
            let json = StatusJson {
                sync,
                worker: worker.as_ref(),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => println!("{}", format_status(sync, worker.as_ref())),
    }
    Ok(())
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `ql submit`: deliver a mutation directly when possible, otherwise queue it.
//!
//! A direct attempt is skipped when `--queue` is given or a running worker
//! reports the network offline. Anything not acknowledged is queued under
//! the same id, and a worker that is online is asked to drain right away.

use std::time::Duration;

use ql_core::{Config, HttpSubmitter, OperationType, PendingOperation, SubmitResult, Submitter};
use ql_ipc::WorkerStatus;
use serde::Serialize;
use serde_json::Value;

use super::running_worker;
use crate::cli::OutputFormat;
use crate::context::ForegroundContext;
use crate::error::{Error, Result};
use crate::worker::{get_socket_path, WorkerClient};

/// What happened to a submitted mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "delivery")]
pub enum Delivery {
    Submitted,
    Queued { sync_requested: bool },
}

#[derive(Serialize)]
struct SubmitOutputJson<'a> {
    id: &'a str,
    #[serde(flatten)]
    delivery: Delivery,
    pending: usize,
}

pub fn run(
    ctx: &mut ForegroundContext,
    operation_type: &str,
    payload: &str,
    queue: bool,
    output: OutputFormat,
) -> Result<()> {
    let operation_type: OperationType = operation_type.parse()?;
    let payload = parse_payload(payload)?;
    let op = ctx.store().new_operation(operation_type, payload);

    let worker = running_worker(ctx.state_dir());
    let known_offline = worker.as_ref().is_some_and(|w| !w.online);

    let delivery = if queue || known_offline {
        queue_and_nudge(ctx, &op, worker.as_ref())?
    } else {
        match submit_direct(ctx.config(), &op)? {
            Ok(()) => Delivery::Submitted,
            Err(e) => {
                tracing::info!(id = %op.id, "direct submit failed, queueing: {}", e);
                queue_and_nudge(ctx, &op, worker.as_ref())?
            }
        }
    };

    let pending = ctx.status().pending_count;
    match output {
        OutputFormat::Json => {
            let json = SubmitOutputJson {
                id: &op.id,
                delivery,
                pending,
            };
            println!("{}", serde_json::to_string(&json)?);
        }
        OutputFormat::Text => match delivery {
            Delivery::Submitted => println!("submitted {}", op.id),
            Delivery::Queued { sync_requested } => {
                println!("queued {} ({} pending)", op.id, pending);
                if sync_requested {
                    println!("sync requested");
                }
            }
        },
    }
    Ok(())
}

/// Parses the payload argument; it must be a JSON object.
pub fn parse_payload(raw: &str) -> Result<Value> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| Error::InvalidPayload(e.to_string()))?;
    if !value.is_object() {
        return Err(Error::InvalidPayload("expected a JSON object".to_string()));
    }
    Ok(value)
}

/// One attempt against the API. The outer error is local setup failure.
fn submit_direct(config: &Config, op: &PendingOperation) -> Result<SubmitResult> {
    let timeout = Duration::from_secs(config.sync.submit_timeout_secs.max(1));
    let submitter = HttpSubmitter::new(&config.api_base_url, timeout)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(submitter.submit(op)))
}

fn queue_and_nudge(
    ctx: &mut ForegroundContext,
    op: &PendingOperation,
    worker: Option<&WorkerStatus>,
) -> Result<Delivery> {
    ctx.queue(op)?;

    if !worker.is_some_and(|w| w.online) {
        return Ok(Delivery::Queued {
            sync_requested: false,
        });
    }

    let requested = WorkerClient::connect(&get_socket_path(ctx.state_dir()))
        .and_then(|mut client| client.request_sync());
    match requested {
        Ok(_) => Ok(Delivery::Queued {
            sync_requested: true,
        }),
        Err(e) => {
            tracing::warn!("could not ask the worker to sync: {}", e);
            Ok(Delivery::Queued {
                sync_requested: false,
            })
        }
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;

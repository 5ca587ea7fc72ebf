// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Unix socket server for foreground contexts.
//!
//! Each connection carries any number of framed requests. After `Subscribe`
//! the same connection also receives every background message as an
//! `Event` until either side hangs up or the worker shuts down.

use std::path::Path;
use std::sync::Arc;

use ql_ipc::{framing_async, BackgroundMessage, ForegroundRequest, WorkerResponse};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc};

use crate::error::Result;
use crate::worker::Worker;

/// Binds the worker socket, replacing a stale one.
pub fn bind(socket_path: &Path) -> Result<UnixListener> {
    let _ = std::fs::remove_file(socket_path);
    Ok(UnixListener::bind(socket_path)?)
}

/// Accepts connections until the worker is asked to shut down, then waits
/// for its background tasks.
pub async fn run(listener: UnixListener, worker: Arc<Worker>) {
    let cancel = worker.cancellation();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => {
                    let worker = Arc::clone(&worker);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, worker).await {
                            tracing::debug!("connection ended with error: {}", e);
                        }
                    });
                }
                Err(e) => tracing::warn!("failed to accept connection: {}", e),
            },
        }
    }
    worker.join().await;
    tracing::info!("server stopped");
}

pub(crate) async fn handle_connection(stream: UnixStream, worker: Arc<Worker>) -> std::io::Result<()> {
    let (mut reader, mut writer) = stream.into_split();

    // Reads run in their own task so a partially read frame is never
    // dropped by the select below.
    let (request_tx, mut requests) = mpsc::channel::<ForegroundRequest>(8);
    let read_task = tokio::spawn(async move {
        loop {
            match framing_async::read_message::<_, ForegroundRequest>(&mut reader).await {
                Ok(Some(request)) => {
                    if request_tx.send(request).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("failed to read request: {}", e);
                    break;
                }
            }
        }
    });

    let cancel = worker.cancellation();
    let mut events: Option<broadcast::Receiver<BackgroundMessage>> = None;

    loop {
        tokio::select! {
            request = requests.recv() => {
                let Some(request) = request else { break };
                if matches!(request, ForegroundRequest::Subscribe) && events.is_none() {
                    events = Some(worker.subscribe());
                }
                let response = worker.handle(request).await;
                framing_async::write_message(&mut writer, &response).await?;
            }
            event = next_event(&mut events) => match event {
                Ok(message) => {
                    let response = WorkerResponse::Event { message };
                    if let Err(e) = framing_async::write_message(&mut writer, &response).await {
                        tracing::debug!("subscriber went away: {}", e);
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("subscriber lagged by {} messages", n);
                }
                Err(broadcast::error::RecvError::Closed) => events = None,
            },
            _ = cancel.cancelled() => break,
        }
    }

    read_task.abort();
    Ok(())
}

async fn next_event(
    events: &mut Option<broadcast::Receiver<BackgroundMessage>>,
) -> std::result::Result<BackgroundMessage, broadcast::error::RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

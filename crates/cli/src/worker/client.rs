// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking IPC client for the questlined worker.

use std::io::ErrorKind;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use ql_core::BackgroundMessage;
use ql_ipc::{framing, FetchRequest, FetchResponse, ForegroundRequest, WorkerResponse, WorkerStatus};

use crate::error::{Error, Result};

/// Version sent in the handshake.
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Timeout for a single request/response exchange.
const TIMEOUT_SECS: u64 = 5;

/// Fetches may wait on the origin.
const FETCH_TIMEOUT_SECS: u64 = 60;

/// A client connection to the worker.
pub struct WorkerClient {
    stream: UnixStream,
}

impl WorkerClient {
    /// Connect to the worker at the given socket path.
    pub fn connect(socket_path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(socket_path)
            .map_err(|e| Error::Worker(format!("failed to connect to worker: {}", e)))?;
        let client = WorkerClient { stream };
        client.set_timeout(Some(Duration::from_secs(TIMEOUT_SECS)))?;
        Ok(client)
    }

    fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream
            .set_read_timeout(timeout)
            .map_err(|e| Error::Worker(format!("failed to set read timeout: {}", e)))?;
        self.stream
            .set_write_timeout(timeout)
            .map_err(|e| Error::Worker(format!("failed to set write timeout: {}", e)))?;
        Ok(())
    }

    /// Send a request and receive a response.
    fn request(&mut self, request: &ForegroundRequest) -> Result<WorkerResponse> {
        framing::write_message(&mut self.stream, request).map_err(io_error)?;
        let response = framing::read_message(&mut self.stream).map_err(io_error)?;
        match response {
            WorkerResponse::Error { message } => Err(Error::Worker(message)),
            other => Ok(other),
        }
    }

    pub fn ping(&mut self) -> Result<()> {
        match self.request(&ForegroundRequest::Ping)? {
            WorkerResponse::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Version handshake; a different worker version is an error.
    pub fn hello(&mut self) -> Result<()> {
        let request = ForegroundRequest::Hello {
            version: CLI_VERSION.to_string(),
        };
        match self.request(&request)? {
            WorkerResponse::Hello { version } if version == CLI_VERSION => Ok(()),
            WorkerResponse::Hello { version } => Err(Error::WorkerVersionMismatch {
                worker_version: version,
                cli_version: CLI_VERSION.to_string(),
            }),
            other => Err(unexpected(other)),
        }
    }

    pub fn status(&mut self) -> Result<WorkerStatus> {
        match self.request(&ForegroundRequest::Status)? {
            WorkerResponse::Status(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    /// Asks for a drain. Returns false if one was already running.
    pub fn request_sync(&mut self) -> Result<bool> {
        match self.request(&ForegroundRequest::RequestSync)? {
            WorkerResponse::SyncAccepted { started } => Ok(started),
            other => Err(unexpected(other)),
        }
    }

    /// Delivers a wake event. `None` when the worker ignored the tag.
    pub fn wake(&mut self, tag: &str) -> Result<Option<bool>> {
        let request = ForegroundRequest::Wake {
            tag: tag.to_string(),
        };
        match self.request(&request)? {
            WorkerResponse::SyncAccepted { started } => Ok(Some(started)),
            WorkerResponse::Ack => Ok(None),
            other => Err(unexpected(other)),
        }
    }

    pub fn network_changed(&mut self, online: bool) -> Result<()> {
        match self.request(&ForegroundRequest::NetworkChanged { online })? {
            WorkerResponse::Ack => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Routes a read request through the worker's cache.
    pub fn fetch(&mut self, request: FetchRequest) -> Result<FetchResponse> {
        self.set_timeout(Some(Duration::from_secs(FETCH_TIMEOUT_SECS)))?;
        let result = match self.request(&ForegroundRequest::Fetch { request })? {
            WorkerResponse::Fetched { response } => Ok(response),
            other => Err(unexpected(other)),
        };
        self.set_timeout(Some(Duration::from_secs(TIMEOUT_SECS)))?;
        result
    }

    pub fn shutdown(&mut self) -> Result<()> {
        match self.request(&ForegroundRequest::Shutdown)? {
            WorkerResponse::ShuttingDown => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Turns this connection into a stream of background messages.
    pub fn subscribe(mut self) -> Result<Subscription> {
        match self.request(&ForegroundRequest::Subscribe)? {
            WorkerResponse::Subscribed => {}
            other => return Err(unexpected(other)),
        }
        // Events arrive whenever the worker has something to say.
        self.set_timeout(None)?;
        Ok(Subscription {
            stream: self.stream,
        })
    }
}

/// Background messages on a subscribed connection.
pub struct Subscription {
    stream: UnixStream,
}

impl Subscription {
    /// Blocks for the next message. `None` once the worker hangs up.
    pub fn next_message(&mut self) -> Result<Option<BackgroundMessage>> {
        match framing::read_message(&mut self.stream) {
            Ok(WorkerResponse::Event { message }) => Ok(Some(message)),
            Ok(other) => Err(unexpected(other)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(io_error(e)),
        }
    }
}

impl Iterator for Subscription {
    type Item = Result<BackgroundMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_message().transpose()
    }
}

fn io_error(e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => {
            Error::WorkerTimeout(format!("no response within {}s", TIMEOUT_SECS))
        }
        _ => Error::Io(e),
    }
}

fn unexpected(response: WorkerResponse) -> Error {
    Error::UnexpectedResponse(format!("{:?}", response))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

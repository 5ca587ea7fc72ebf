// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared IPC protocol between foreground contexts and the background worker.
//!
//! This crate defines the message types and framing protocol used between
//! the `ql` CLI and the `questlined` worker. Messages are serialized as JSON
//! with length-prefixed framing. Every request gets exactly one response,
//! except `Subscribe`, after which the worker keeps the connection open and
//! streams `Event` responses until either side hangs up.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use ql_core::{BackgroundMessage, SyncResult, SyncStatus};

/// Socket filename within the state directory.
pub const SOCKET_NAME: &str = "worker.sock";
/// PID filename within the state directory.
pub const PID_NAME: &str = "worker.pid";
/// Lock filename for the single instance guarantee.
pub const LOCK_NAME: &str = "worker.lock";
/// Log filename within the state directory.
pub const LOG_NAME: &str = "worker.log";

// ============================================================================
// Fetch model types
// ============================================================================

/// What a fetched resource will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// A top-level HTML document.
    Document,
    /// An image; gets the placeholder when nothing else is available.
    Image,
    /// A script.
    Script,
    /// A stylesheet.
    Style,
    /// A web font.
    Font,
    /// Anything else, including API calls.
    #[default]
    Other,
}

/// A read request routed through the response cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,
    /// Intended use of the response.
    #[serde(default)]
    pub destination: Destination,
    /// True for top-level navigations.
    #[serde(default)]
    pub navigate: bool,
}

impl FetchRequest {
    /// A plain GET of a subresource.
    pub fn get(url: impl Into<String>) -> Self {
        FetchRequest {
            method: "GET".to_string(),
            url: url.into(),
            destination: Destination::Other,
            navigate: false,
        }
    }

    /// A top-level navigation to a document.
    pub fn navigation(url: impl Into<String>) -> Self {
        FetchRequest {
            destination: Destination::Document,
            navigate: true,
            ..FetchRequest::get(url)
        }
    }

    /// A GET of an image.
    pub fn image(url: impl Into<String>) -> Self {
        FetchRequest {
            destination: Destination::Image,
            ..FetchRequest::get(url)
        }
    }

    /// Returns a copy with a different method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Fresh from the network.
    Network,
    /// Served from the response cache.
    Cache,
    /// The bundled or cached placeholder image.
    Placeholder,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::Placeholder => "placeholder",
        };
        write!(f, "{}", s)
    }
}

/// A response returned by the response cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Content type, if the origin sent one.
    pub content_type: Option<String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
    /// Where the response came from.
    pub source: ResponseSource,
}

impl FetchResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// Protocol types
// ============================================================================

/// Request sent from a foreground context to the worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ForegroundRequest {
    /// Ping to check if the worker is alive.
    Ping,
    /// Version handshake request.
    Hello { version: String },
    /// Get worker status.
    Status,
    /// Ask the coordinator to drain the pending store now.
    RequestSync,
    /// Deliver a background wake event.
    Wake { tag: String },
    /// Report a connectivity change seen by the foreground.
    NetworkChanged { online: bool },
    /// Route a read request through the response cache.
    Fetch { request: FetchRequest },
    /// Keep the connection open and stream background messages.
    Subscribe,
    /// Graceful shutdown.
    Shutdown,
}

/// Response sent from the worker to a foreground context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum WorkerResponse {
    /// Pong response.
    Pong,
    /// Version handshake response.
    Hello { version: String },
    /// Status response.
    Status(WorkerStatus),
    /// Sync request handled; `started` is false if a drain was already running.
    SyncAccepted { started: bool },
    /// Request handled with nothing to report.
    Ack,
    /// Result of a fetch.
    Fetched { response: FetchResponse },
    /// Subscription established; events follow.
    Subscribed,
    /// A background message on a subscribed connection.
    Event { message: BackgroundMessage },
    /// Shutdown acknowledged.
    ShuttingDown,
    /// Error response.
    Error { message: String },
}

/// Worker status information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerStatus {
    /// Current worker PID.
    pub pid: u32,
    /// Uptime in seconds.
    pub uptime_secs: u64,
    /// Sync status as the coordinator sees it.
    pub sync: SyncStatus,
    /// Network observer state.
    pub online: bool,
    /// Current cache namespace.
    pub cache_namespace: String,
    /// Whether the cache has been activated.
    pub cache_active: bool,
    /// Whether periodic background wake is supported.
    pub wake_supported: bool,
}

// ============================================================================
// Message framing
// ============================================================================

/// Maximum message size (16 MiB); fetched bodies travel inline.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

fn check_len(len: usize) -> std::io::Result<()> {
    if len > MAX_MESSAGE_SIZE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("message too large: {} bytes (max {})", len, MAX_MESSAGE_SIZE),
        ));
    }
    Ok(())
}

fn encode<T: Serialize>(message: &T) -> std::io::Result<(u32, Vec<u8>)> {
    let json = serde_json::to_vec(message)
        .map_err(|e| std::io::Error::other(format!("serialize error: {}", e)))?;
    check_len(json.len())?;
    let len = u32::try_from(json.len()).map_err(|_| std::io::Error::other("message too large"))?;
    Ok((len, json))
}

fn decode<T: serde::de::DeserializeOwned>(buf: &[u8]) -> std::io::Result<T> {
    serde_json::from_slice(buf).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("deserialize error: {}", e),
        )
    })
}

/// IPC message framing.
///
/// Messages are framed as:
/// - 4 bytes: message length (big-endian u32)
/// - N bytes: JSON-encoded message
pub mod framing {
    use std::io::{Read, Write};

    use serde::de::DeserializeOwned;
    use serde::Serialize;

    /// Write a serializable message to the given writer.
    pub fn write_message<W: Write, T: Serialize>(
        writer: &mut W,
        message: &T,
    ) -> std::io::Result<()> {
        let (len, json) = super::encode(message)?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&json)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a deserializable message from the given reader.
    pub fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> std::io::Result<T> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let len = u32::from_be_bytes(len_buf) as usize;
        super::check_len(len)?;

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;
        super::decode(&buf)
    }
}

/// Async counterpart of [`framing`] for tokio streams.
pub mod framing_async {
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    /// Write a serializable message to the given async writer.
    pub async fn write_message<W: AsyncWrite + Unpin, T: Serialize>(
        writer: &mut W,
        message: &T,
    ) -> std::io::Result<()> {
        let (len, json) = super::encode(message)?;
        writer.write_all(&len.to_be_bytes()).await?;
        writer.write_all(&json).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read a deserializable message from the given async reader.
    ///
    /// Returns `Ok(None)` on a clean EOF before the length prefix.
    pub async fn read_message<R: AsyncRead + Unpin, T: DeserializeOwned>(
        reader: &mut R,
    ) -> std::io::Result<Option<T>> {
        let mut len_buf = [0u8; 4];
        match reader.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        }
        let len = u32::from_be_bytes(len_buf) as usize;
        super::check_len(len)?;

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await?;
        super::decode(&buf).map(Some)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

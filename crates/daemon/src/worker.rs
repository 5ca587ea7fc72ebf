// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The background execution context.
//!
//! [`Worker::start`] wires the pieces together in a fixed order: pending
//! store, response cache (installed, then activated), broadcaster,
//! coordinator, network observer, wake. Foreground requests arrive through
//! [`Worker::handle`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ql_core::{ClockSource, Config, HttpSubmitter, PendingStore, Submitter, SystemClock};
use ql_ipc::{BackgroundMessage, ForegroundRequest, WorkerResponse, WorkerStatus};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::broadcast::StatusBroadcaster;
use crate::cache::{CacheStore, Fetcher, HttpFetcher, ResponseCache};
use crate::error::{Error, Result};
use crate::network::{spawn_probe, NetworkObserver, ProbeTarget};
use crate::sync::{Coordinator, CoordinatorConfig, CoordinatorHandle, SyncTrigger, TriggerOutcome};
use crate::wake::BackgroundWake;

/// Cache root inside the state directory. Each namespace is a subdirectory.
pub const CACHE_DIR: &str = "cache";

/// Timeout for cache fetches against the origin.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// The external collaborators a worker talks to.
pub struct WorkerParts {
    pub submitter: Arc<dyn Submitter>,
    pub fetcher: Arc<dyn Fetcher>,
    pub clock: Arc<dyn ClockSource>,
}

impl WorkerParts {
    /// HTTP submitter and fetcher on the system clock.
    pub fn from_config(config: &Config) -> Result<Self> {
        let submitter = HttpSubmitter::new(
            &config.api_base_url,
            Duration::from_secs(config.sync.submit_timeout_secs.max(1)),
        )?;
        Ok(WorkerParts {
            submitter: Arc::new(submitter),
            fetcher: Arc::new(HttpFetcher::new(FETCH_TIMEOUT)?),
            clock: Arc::new(SystemClock),
        })
    }
}

pub struct Worker {
    state_dir: PathBuf,
    store: PendingStore,
    cache: ResponseCache,
    broadcaster: StatusBroadcaster,
    coordinator: CoordinatorHandle,
    observer: Arc<NetworkObserver>,
    wake: BackgroundWake,
    cancel: CancellationToken,
    started: Instant,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Worker {
    /// Initializes every component and starts the background tasks.
    pub async fn start(state_dir: &Path, config: &Config, parts: WorkerParts) -> Result<Self> {
        let store = PendingStore::with_clock(state_dir, Arc::clone(&parts.clock))?;

        let cache_store = CacheStore::open(&state_dir.join(CACHE_DIR), &config.namespace())?;
        let cache = ResponseCache::new(cache_store, parts.fetcher, &config.cache)?;
        cache.install(&config.cache.critical_assets).await;
        let evicted = cache.activate()?;
        if !evicted.is_empty() {
            tracing::info!(?evicted, "evicted stale cache namespaces");
        }

        let broadcaster = StatusBroadcaster::default();
        let (coordinator, _) = Coordinator::spawn(
            store.clone(),
            parts.submitter,
            broadcaster.clone(),
            parts.clock,
            CoordinatorConfig::from_config(&config.sync, state_dir),
        )?;
        let observer = Arc::new(NetworkObserver::new(broadcaster.clone(), coordinator.clone()));
        let wake = BackgroundWake::from_config(&config.sync);
        let cancel = CancellationToken::new();

        let mut tasks = Vec::new();
        match wake.spawn_periodic(coordinator.clone(), cancel.clone()) {
            Some(task) => tasks.push(task),
            None => tracing::info!("periodic background wake not configured"),
        }
        if config.sync.probe_interval_secs > 0 {
            let target = Url::parse(&config.api_base_url)
                .ok()
                .as_ref()
                .and_then(ProbeTarget::from_url)
                .ok_or_else(|| Error::InvalidUrl {
                    url: config.api_base_url.clone(),
                    reason: "no host to probe".to_string(),
                })?;
            tasks.push(spawn_probe(
                Arc::clone(&observer),
                target,
                Duration::from_secs(config.sync.probe_interval_secs),
                cancel.clone(),
            ));
        }

        tracing::info!(
            pending = coordinator.status().pending_count,
            namespace = %cache.namespace(),
            "worker started"
        );

        Ok(Worker {
            state_dir: state_dir.to_path_buf(),
            store,
            cache,
            broadcaster,
            coordinator,
            observer,
            wake,
            cancel,
            started: Instant::now(),
            tasks: Mutex::new(tasks),
        })
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn store(&self) -> &PendingStore {
        &self.store
    }

    pub fn coordinator(&self) -> &CoordinatorHandle {
        &self.coordinator
    }

    /// Registers a foreground context for background messages.
    pub fn subscribe(&self) -> broadcast::Receiver<BackgroundMessage> {
        self.broadcaster.subscribe()
    }

    /// Cancelled once shutdown is requested.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Waits for the background tasks after shutdown.
    pub async fn join(&self) {
        let tasks = match self.tasks.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(_) => Vec::new(),
        };
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("background task failed: {}", e);
            }
        }
    }

    pub async fn status(&self) -> WorkerStatus {
        let sync = match self.coordinator.refresh().await {
            Ok(status) => status,
            Err(_) => self.coordinator.status(),
        };
        WorkerStatus {
            pid: std::process::id(),
            uptime_secs: self.started.elapsed().as_secs(),
            sync,
            online: self.observer.is_online(),
            cache_namespace: self.cache.namespace().to_string(),
            cache_active: self.cache.is_active(),
            wake_supported: self.wake.probe(),
        }
    }

    /// Answers one foreground request.
    ///
    /// `Subscribe` only acknowledges here; the connection streams events.
    pub async fn handle(&self, request: ForegroundRequest) -> WorkerResponse {
        match request {
            ForegroundRequest::Ping => WorkerResponse::Pong,
            ForegroundRequest::Hello { version } => {
                tracing::debug!(client_version = %version, "hello");
                WorkerResponse::Hello {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                }
            }
            ForegroundRequest::Status => WorkerResponse::Status(self.status().await),
            ForegroundRequest::RequestSync => {
                if let Err(e) = self.coordinator.refresh().await {
                    return error_response(e);
                }
                match self.coordinator.trigger(SyncTrigger::Requested).await {
                    Ok(outcome) => sync_accepted(outcome),
                    Err(e) => error_response(e),
                }
            }
            ForegroundRequest::Wake { tag } => match self.wake.deliver(&tag, &self.coordinator).await {
                Some(outcome) => sync_accepted(outcome),
                None => WorkerResponse::Ack,
            },
            ForegroundRequest::NetworkChanged { online } => {
                self.observer.report(online).await;
                WorkerResponse::Ack
            }
            ForegroundRequest::Fetch { request } => match self.cache.handle(&request).await {
                Ok(response) => WorkerResponse::Fetched { response },
                Err(e) => WorkerResponse::Error {
                    message: e.to_string(),
                },
            },
            ForegroundRequest::Subscribe => WorkerResponse::Subscribed,
            ForegroundRequest::Shutdown => {
                tracing::info!("shutdown requested");
                self.shutdown();
                WorkerResponse::ShuttingDown
            }
        }
    }
}

fn sync_accepted(outcome: TriggerOutcome) -> WorkerResponse {
    WorkerResponse::SyncAccepted {
        started: outcome == TriggerOutcome::Started,
    }
}

fn error_response(e: Error) -> WorkerResponse {
    WorkerResponse::Error {
        message: e.to_string(),
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! questlined - the questline background worker.
//!
//! Owns the response cache and drains the pending operation store in the
//! state directory. Listens on a Unix socket for requests and subscriptions
//! from `ql` processes.
//!
//! Usage:
//!   questlined --state-dir <path>

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use ql_core::Config;
use questlined::lifecycle::{acquire_lock, cleanup, write_pid, RuntimePaths};
use questlined::{server, Error, Result, Worker, WorkerParts};

#[derive(Parser, Debug)]
#[command(name = "questlined", version, about = "questline background worker")]
struct Args {
    /// State directory holding the queue, cache, and socket.
    #[arg(long)]
    state_dir: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let state_dir = match args.state_dir.or_else(ql_core::env::resolve_state_dir) {
        Some(dir) => dir,
        None => {
            return Err(Error::Io(std::io::Error::other(
                "cannot determine state directory; pass --state-dir",
            )))
        }
    };
    fs::create_dir_all(&state_dir)?;
    let paths = RuntimePaths::new(&state_dir);

    setup_logging(&paths.log);
    tracing::info!("questlined starting, state_dir={}", state_dir.display());

    let config = Config::load(&state_dir)?;
    let _lock = acquire_lock(&paths.lock)?;
    write_pid(&paths.pid)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(serve(&state_dir, &paths, config));

    cleanup(&paths);
    tracing::info!("questlined stopped");
    result
}

async fn serve(state_dir: &Path, paths: &RuntimePaths, config: Config) -> Result<()> {
    let parts = WorkerParts::from_config(&config)?;
    let worker = Arc::new(Worker::start(state_dir, &config, parts).await?);

    let listener = server::bind(&paths.socket)?;
    tracing::info!("listening on {}", paths.socket.display());

    // Signal readiness to the parent process
    println!("READY");
    let _ = std::io::stdout().flush();

    tokio::spawn(shutdown_on_signal(Arc::clone(&worker)));
    server::run(listener, worker).await;
    Ok(())
}

async fn shutdown_on_signal(worker: Arc<Worker>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("cannot listen for SIGTERM: {}", e);
            return;
        }
    };
    tokio::select! {
        _ = term.recv() => tracing::info!("received SIGTERM"),
        _ = tokio::signal::ctrl_c() => tracing::info!("received interrupt"),
    }
    worker.shutdown();
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

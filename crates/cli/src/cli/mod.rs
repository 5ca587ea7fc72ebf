// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Connectivity reported by `ql network`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NetworkState {
    Online,
    Offline,
}

impl NetworkState {
    pub fn is_online(self) -> bool {
        self == NetworkState::Online
    }
}

#[derive(Parser)]
#[command(name = "ql")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first sync for questline: queue mutations, drain them, watch the results")]
pub struct Cli {
    /// State directory shared with the worker
    #[arg(long, global = true, value_name = "path")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a mutation, queueing it when it cannot be delivered now
    #[command(after_help = "\
Examples:
  ql submit quest-completion '{\"questId\": \"q1\"}'
  ql submit mood-update '{\"mood\": 4}' --queue")]
    Submit {
        /// Operation type (quest-completion, mood-update, profile-update)
        #[arg(value_parser = non_empty_string)]
        operation_type: String,

        /// Payload as a JSON object
        payload: String,

        /// Skip the direct attempt and queue right away
        #[arg(long)]
        queue: bool,

        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List operations waiting to be delivered
    List {
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show sync status
    Status {
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Ask the worker to drain the queue now
    Sync,

    /// Deliver a background wake event to the worker
    Wake {
        /// Wake tag (defaults to the configured sync tag)
        tag: Option<String>,
    },

    /// Report a connectivity change to the worker
    Network {
        #[arg(value_enum)]
        state: NetworkState,
    },

    /// Stream sync events from the worker
    Watch {
        /// Exit after this many events
        #[arg(long, short = 'n')]
        count: Option<usize>,
    },

    /// Fetch a URL through the worker's response cache
    Fetch {
        /// Absolute URL or path relative to the cache origin
        url: String,

        /// Treat as a page navigation (network-first)
        #[arg(long, conflicts_with = "image")]
        navigate: bool,

        /// Treat as an image (placeholder on failure)
        #[arg(long)]
        image: bool,

        /// HTTP method
        #[arg(long, short = 'X', default_value = "GET")]
        method: String,
    },

    /// Manage the background worker
    #[command(subcommand)]
    Worker(WorkerCommand),
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum WorkerCommand {
    /// Start the worker if it is not running
    Start,
    /// Stop the worker
    Stop,
    /// Show worker status
    Status,
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;

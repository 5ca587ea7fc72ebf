// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

#[test]
fn submit_defaults() {
    let cli = parse(&["ql", "submit", "quest-completion", r#"{"questId":"q1"}"#]).unwrap();
    match cli.command {
        Command::Submit {
            operation_type,
            payload,
            queue,
            output,
        } => {
            assert_eq!(operation_type, "quest-completion");
            assert_eq!(payload, r#"{"questId":"q1"}"#);
            assert!(!queue);
            assert_eq!(output, OutputFormat::Text);
        }
        other => panic!("expected Submit, got {:?}", other),
    }
}

#[test]
fn submit_rejects_blank_type() {
    assert!(parse(&["ql", "submit", "  ", "{}"]).is_err());
}

#[test]
fn state_dir_is_global() {
    let cli = parse(&["ql", "list", "--state-dir", "/tmp/ql"]).unwrap();
    assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/ql")));
}

#[parameterized(
    text = { &["ql", "list"], OutputFormat::Text },
    json_long = { &["ql", "list", "--output", "json"], OutputFormat::Json },
    json_short = { &["ql", "list", "-o", "json"], OutputFormat::Json },
)]
fn list_output(args: &[&str], expected: OutputFormat) {
    match parse(args).unwrap().command {
        Command::List { output } => assert_eq!(output, expected),
        other => panic!("expected List, got {:?}", other),
    }
}

#[parameterized(
    online = { "online", true },
    offline = { "offline", false },
)]
fn network_state(arg: &str, online: bool) {
    match parse(&["ql", "network", arg]).unwrap().command {
        Command::Network { state } => assert_eq!(state.is_online(), online),
        other => panic!("expected Network, got {:?}", other),
    }
}

#[test]
fn network_rejects_unknown_state() {
    assert!(parse(&["ql", "network", "flaky"]).is_err());
}

#[test]
fn fetch_navigate_and_image_conflict() {
    assert!(parse(&["ql", "fetch", "/", "--navigate", "--image"]).is_err());

    match parse(&["ql", "fetch", "/avatar.png", "--image"]).unwrap().command {
        Command::Fetch {
            url,
            navigate,
            image,
            method,
        } => {
            assert_eq!(url, "/avatar.png");
            assert!(!navigate);
            assert!(image);
            assert_eq!(method, "GET");
        }
        other => panic!("expected Fetch, got {:?}", other),
    }
}

#[test]
fn wake_tag_is_optional() {
    match parse(&["ql", "wake"]).unwrap().command {
        Command::Wake { tag } => assert_eq!(tag, None),
        other => panic!("expected Wake, got {:?}", other),
    }
}

#[test]
fn watch_count() {
    match parse(&["ql", "watch", "-n", "2"]).unwrap().command {
        Command::Watch { count } => assert_eq!(count, Some(2)),
        other => panic!("expected Watch, got {:?}", other),
    }
}

#[parameterized(
    start = { "start", WorkerCommand::Start },
    stop = { "stop", WorkerCommand::Stop },
    status = { "status", WorkerCommand::Status },
)]
fn worker_subcommands(arg: &str, expected: WorkerCommand) {
    match parse(&["ql", "worker", arg]).unwrap().command {
        Command::Worker(cmd) => assert_eq!(cmd, expected),
        other => panic!("expected Worker, got {:?}", other),
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use ql_ipc::FetchRequest;

use super::connect_worker;
use crate::context::ForegroundContext;
use crate::error::Result;

/// Builds the request for `ql fetch`.
pub fn build_request(url: &str, navigate: bool, image: bool, method: &str) -> FetchRequest {
    let request = if navigate {
        FetchRequest::navigation(url)
    } else if image {
        FetchRequest::image(url)
    } else {
        FetchRequest::get(url)
    };
    request.with_method(method.to_ascii_uppercase())
}

/// Fetches through the worker's response cache. The summary line goes to
/// stderr and the body to stdout, so the output can be piped.
pub fn run(
    ctx: &ForegroundContext,
    url: &str,
    navigate: bool,
    image: bool,
    method: &str,
) -> Result<()> {
    let request = build_request(url, navigate, image, method);
    let mut client = connect_worker(ctx.state_dir())?;
    let response = client.fetch(request)?;

    eprintln!(
        "{} {} ({}, {} bytes)",
        response.status,
        response.content_type.as_deref().unwrap_or("-"),
        response.source,
        response.body.len()
    );

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&response.body)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;

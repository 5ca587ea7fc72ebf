// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::context::ForegroundContext;
use crate::display::format_operation_line;
use crate::error::Result;

pub fn run(ctx: &ForegroundContext, output: OutputFormat) -> Result<()> {
    let ops = ctx.store().list()?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ops)?),
        OutputFormat::Text => {
            if ops.is_empty() {
                println!("no pending operations");
            }
            for op in &ops {
                println!("{}", format_operation_line(op));
            }
        }
    }
    Ok(())
}

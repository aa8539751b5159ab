// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Report rendering shared by `burst` and `bank`

use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Aligned lines for people
    Text,
    /// Pretty-printed JSON for scripts
    Json,
}

/// Render `report` to a string; text reports supply their own trailing newline
pub fn render<T: Serialize + Display>(
    report: &T,
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report).map(|json| json + "\n"),
    }
}

/// Write `report` to stdout
pub fn emit<T: Serialize + Display>(report: &T, format: OutputFormat) -> anyhow::Result<()> {
    print!("{}", render(report, format)?);
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! coalesce - drive the locks and the coalescing executor from the shell

mod commands;
mod config;
mod error;
mod output;

use clap::{Parser, Subcommand};
use commands::{bank, burst};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;
use crate::error::CliError;

#[derive(Parser)]
#[command(
    name = "coalesce",
    version,
    about = "Single-flight request coalescing over a slow blocking device"
)]
struct Cli {
    /// TOML file with [executor] and [device] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fire concurrent requests per key and report how they coalesced
    Burst(burst::BurstArgs),
    /// Run concurrent deposit, withdraw and read against one account
    Bank(bank::BankArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CliError>() {
                Some(cli_error) => eprint!("{}", cli_error),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Burst(args) => burst::burst(args, config).await,
        Commands::Bank(args) => bank::bank(args).await,
    }
}

/// Logs go to stderr so command output on stdout stays machine readable.
/// `RUST_LOG` takes precedence over `-v`.
fn setup_logging(verbose: u8) {
    use std::io::IsTerminal;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();
}

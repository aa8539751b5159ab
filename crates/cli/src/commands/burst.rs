// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Burst command: many callers per key against a slow simulated device

use crate::config::Config;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use coalesce_adapters::{SimulatedDevice, TracedDevice};
use coalesce_engine::{CoalescingExecutor, ExecuteError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Args)]
pub struct BurstArgs {
    /// Request keys; every key gets its own burst of callers
    #[arg(long = "key", required = true, num_args = 1..)]
    pub keys: Vec<String>,

    /// Concurrent callers per key
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
    pub callers: u32,

    /// Device latency, e.g. 250ms (overrides the config file)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub latency: Option<Duration>,

    /// Keys the device fails for
    #[arg(long = "fail")]
    pub fail: Vec<String>,

    /// How long each caller waits before giving up
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Number of bursts to run one after another
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub rounds: u32,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// How one key's callers fared in one round
#[derive(Debug, Serialize)]
pub struct KeyReport {
    pub key: String,
    pub callers: usize,
    pub device_calls: u64,
    pub distinct_outcomes: usize,
    /// The shared outcome, or `mixed` when callers disagreed
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct RoundReport {
    pub round: u32,
    pub elapsed_ms: u64,
    pub keys: Vec<KeyReport>,
}

#[derive(Debug, Serialize)]
pub struct BurstReport {
    pub rounds: Vec<RoundReport>,
    pub total_device_calls: u64,
}

impl fmt::Display for BurstReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for round in &self.rounds {
            writeln!(f, "round {} ({}ms)", round.round, round.elapsed_ms)?;
            for k in &round.keys {
                writeln!(
                    f,
                    "  {:<24} callers={:<4} device_calls={:<3} outcomes={:<3} {}",
                    k.key, k.callers, k.device_calls, k.distinct_outcomes, k.result
                )?;
            }
        }
        writeln!(f, "total device calls: {}", self.total_device_calls)
    }
}

pub async fn burst(args: BurstArgs, config: Config) -> Result<()> {
    let mut device_config = config.device;
    if let Some(latency) = args.latency {
        device_config.latency = latency;
    }
    for key in args.fail {
        device_config = device_config.with_fail_key(key);
    }
    let mut executor_config = config.executor;
    if let Some(timeout) = args.timeout {
        executor_config = executor_config.with_wait_timeout(timeout);
    }

    let device = SimulatedDevice::new(device_config);
    let executor = CoalescingExecutor::new(TracedDevice::new(device.clone()), executor_config);
    let keys: BTreeSet<String> = args.keys.into_iter().collect();

    let mut rounds = Vec::with_capacity(args.rounds as usize);
    for round in 1..=args.rounds {
        let before = device.calls();
        let started = Instant::now();
        let outcomes = fire(&executor, &keys, args.callers).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let after = device.calls();

        let keys = outcomes
            .into_iter()
            .map(|(key, results)| {
                let calls = after.get(&key).copied().unwrap_or(0)
                    - before.get(&key).copied().unwrap_or(0);
                summarize(key, &results, calls)
            })
            .collect();
        tracing::info!(round, elapsed_ms, "burst finished");
        rounds.push(RoundReport {
            round,
            elapsed_ms,
            keys,
        });
    }

    let total_device_calls = device.calls().values().sum();
    output::emit(
        &BurstReport {
            rounds,
            total_device_calls,
        },
        args.format,
    )
}

/// Submit `callers` requests per key and collect every callback's result
async fn fire(
    executor: &CoalescingExecutor<TracedDevice<SimulatedDevice>>,
    keys: &BTreeSet<String>,
    callers: u32,
) -> BTreeMap<String, Vec<Result<String, ExecuteError>>> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    for key in keys {
        for _ in 0..callers {
            let tx = tx.clone();
            let owned = key.clone();
            executor.submit(key, move |result| {
                let _ = tx.send((owned, result));
            });
        }
    }
    // Every sender lives in a callback; the channel closes once all have run
    drop(tx);

    let mut outcomes: BTreeMap<String, Vec<_>> = BTreeMap::new();
    while let Some((key, result)) = rx.recv().await {
        outcomes.entry(key).or_default().push(result);
    }
    outcomes
}

fn describe(result: &Result<String, ExecuteError>) -> String {
    match result {
        Ok(value) => value.clone(),
        Err(e) => format!("error: {}", e),
    }
}

fn summarize(key: String, results: &[Result<String, ExecuteError>], device_calls: u64) -> KeyReport {
    let distinct: BTreeSet<String> = results.iter().map(describe).collect();
    let result = match distinct.len() {
        1 => distinct.iter().next().cloned().unwrap_or_default(),
        _ => "mixed".to_string(),
    };
    KeyReport {
        key,
        callers: results.len(),
        device_calls,
        distinct_outcomes: distinct.len(),
        result,
    }
}

#[cfg(test)]
#[path = "burst_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bank command: a deposit, a withdrawal and a read racing on one account

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use coalesce_core::{Account, TaskId, Transaction};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Args)]
pub struct BankArgs {
    /// Opening balance
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(i64).range(0..))]
    pub base: i64,

    /// Amount the depositor adds
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(i64).range(0..))]
    pub deposit: i64,

    /// Amount the withdrawer takes out, if covered
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(i64).range(0..))]
    pub withdraw: i64,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct BankReport {
    pub base: i64,
    pub transactions: Vec<Transaction>,
    pub withdraw_applied: bool,
    /// What the concurrent reader saw
    pub observed_balance: i64,
    pub final_balance: i64,
}

impl fmt::Display for BankReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "opening balance: {}", self.base)?;
        for t in &self.transactions {
            writeln!(
                f,
                "  {:<8} {:>8} by {:<10} -> {}",
                t.kind.to_string(),
                t.amount,
                t.task.as_str(),
                t.balance_after
            )?;
        }
        if !self.withdraw_applied {
            writeln!(f, "  withdrawal rejected: insufficient funds")?;
        }
        writeln!(f, "reader observed: {}", self.observed_balance)?;
        writeln!(f, "final balance: {}", self.final_balance)
    }
}

pub async fn bank(args: BankArgs) -> Result<()> {
    let report = run(args.base, args.deposit, args.withdraw).await?;
    output::emit(&report, args.format)
}

async fn run(base: i64, deposit: i64, withdraw: i64) -> Result<BankReport> {
    let account = Arc::new(Account::new(base));

    let depositor = {
        let account = Arc::clone(&account);
        tokio::spawn(async move { account.deposit(&TaskId::new("depositor"), deposit).await })
    };
    let withdrawer = {
        let account = Arc::clone(&account);
        tokio::spawn(async move { account.withdraw(&TaskId::new("withdrawer"), withdraw).await })
    };
    let reader = {
        let account = Arc::clone(&account);
        tokio::spawn(async move { account.balance(&TaskId::new("reader")).await })
    };

    depositor.await??;
    let withdraw_applied = withdrawer.await??;
    let observed_balance = reader.await??;
    let final_balance = account.balance(&TaskId::new("auditor")).await?;

    Ok(BankReport {
        base,
        transactions: account.transactions(),
        withdraw_applied,
        observed_balance,
        final_balance,
    })
}

#[cfg(test)]
#[path = "bank_tests.rs"]
mod tests;

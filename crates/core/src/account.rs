// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Account balance guarded by a reentrant lock
//!
//! Deposits and withdrawals log the resulting balance by reading it through
//! [`Account::balance`], which takes the same lock again. Without reentrancy
//! every mutation would deadlock on its own log line.

use crate::lock::{LockError, ReentrantLock};
use crate::task::TaskId;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Errors from account operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("invalid amount {0}: amounts must not be negative")]
    InvalidAmount(i64),
    #[error("balance overflow: {balance} + {amount} does not fit")]
    Overflow { balance: i64, amount: i64 },
}

/// Kind of balance change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "DEPOSIT"),
            TransactionKind::Withdraw => write!(f, "WITHDRAW"),
        }
    }
}

/// A logged balance change
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub task: TaskId,
    pub kind: TransactionKind,
    pub amount: i64,
    /// Balance read back (under the same lock) after the change
    pub balance_after: i64,
}

/// An account whose balance and log are only touched while `lock` is held
#[derive(Debug, Default)]
pub struct Account {
    lock: ReentrantLock,
    balance: Mutex<i64>,
    log: Mutex<Vec<Transaction>>,
}

impl Account {
    pub fn new(balance: i64) -> Self {
        Self {
            lock: ReentrantLock::new(),
            balance: Mutex::new(balance),
            log: Mutex::new(Vec::new()),
        }
    }

    // Callers must hold `lock`; the std mutex is only an interior-mutability cell
    fn cell(&self) -> MutexGuard<'_, i64> {
        self.balance.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add `amount` and log the new balance
    ///
    /// Fails without touching the balance if `amount` is negative or the sum
    /// would overflow.
    pub async fn deposit(&self, task: &TaskId, amount: i64) -> Result<i64, AccountError> {
        check_amount(amount)?;
        self.lock
            .with_lock(task, || async {
                {
                    let mut balance = self.cell();
                    *balance = balance.checked_add(amount).ok_or(AccountError::Overflow {
                        balance: *balance,
                        amount,
                    })?;
                }
                tracing::debug!(%task, amount, "deposited");
                Ok::<_, AccountError>(self.record(task, TransactionKind::Deposit, amount).await?)
            })
            .await?
    }

    /// Subtract `amount` if the balance covers it
    ///
    /// Returns `false` and leaves the balance untouched on insufficient funds.
    pub async fn withdraw(&self, task: &TaskId, amount: i64) -> Result<bool, AccountError> {
        check_amount(amount)?;
        self.lock
            .with_lock(task, || async {
                {
                    let mut balance = self.cell();
                    if *balance < amount {
                        tracing::info!(%task, amount, balance = *balance, "insufficient funds");
                        return Ok(false);
                    }
                    *balance = balance.checked_sub(amount).ok_or(AccountError::Overflow {
                        balance: *balance,
                        amount: -amount,
                    })?;
                }
                self.record(task, TransactionKind::Withdraw, amount).await?;
                Ok::<_, AccountError>(true)
            })
            .await?
    }

    /// Read the balance (reentrant: safe to call while already holding the lock)
    pub async fn balance(&self, task: &TaskId) -> Result<i64, LockError> {
        self.lock.with_lock(task, || async { *self.cell() }).await
    }

    async fn record(
        &self,
        task: &TaskId,
        kind: TransactionKind,
        amount: i64,
    ) -> Result<i64, LockError> {
        let balance_after = self.balance(task).await?;
        tracing::info!(%task, %kind, amount, balance_after, "transaction");
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Transaction {
                task: task.clone(),
                kind,
                amount,
                balance_after,
            });
        Ok(balance_after)
    }

    /// Transactions in the order they were applied
    pub fn transactions(&self) -> Vec<Transaction> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The lock guarding this account
    pub fn lock(&self) -> &ReentrantLock {
        &self.lock
    }
}

fn check_amount(amount: i64) -> Result<(), AccountError> {
    if amount < 0 {
        tracing::warn!(amount, "rejected negative amount");
        return Err(AccountError::InvalidAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;

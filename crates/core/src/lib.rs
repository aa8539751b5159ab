// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! coalesce-core: locking primitives for cooperatively scheduled tasks
//!
//! This crate provides:
//! - Opaque task identities and their generators
//! - A FIFO binary lock and a task-reentrant lock built on it
//! - An account type exercising reentrant critical sections

pub mod account;
pub mod lock;
pub mod task;

pub use account::{Account, AccountError, Transaction, TransactionKind};
pub use lock::{BinaryLock, LockError, ReentrantGuard, ReentrantLock};
pub use task::{IdGen, SequentialIdGen, TaskId, UuidIdGen};

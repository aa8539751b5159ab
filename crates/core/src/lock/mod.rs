// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutual exclusion for cooperatively scheduled tasks
//!
//! This module provides:
//! - **BinaryLock** - A single permit with a FIFO wait queue
//! - **ReentrantLock** - Owner-tracking wrapper that lets the holding task re-enter
//! - **ReentrantGuard** - Scoped acquisition released on every exit path

mod binary;
mod reentrant;

pub use binary::BinaryLock;
pub use reentrant::{ReentrantGuard, ReentrantLock};

use crate::task::TaskId;
use thiserror::Error;

/// Errors reported by the locks in this module
///
/// These are programming errors, not contention: a contended acquisition
/// waits instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("lock not owned by task {task} (owner: {})", .owner.as_ref().map_or("none", |o| o.as_str()))]
    NotOwner { task: TaskId, owner: Option<TaskId> },
    #[error("release without a matching acquire")]
    NotHeld,
    /// The lock was shut down with `close()` while or before waiting
    #[error("lock closed")]
    Closed,
}

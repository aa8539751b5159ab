// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reentrant lock keyed on task identity
//!
//! The owning task may call [`ReentrantLock::lock`] again without suspending;
//! every acquisition must be matched by one [`ReentrantLock::unlock`] from the
//! same task before another task can take the lock.
//!
//! # Cancellation
//!
//! A task that calls `lock()` and is then cancelled before calling `unlock()`
//! leaves the lock held forever. Use [`ReentrantLock::guard`] or
//! [`ReentrantLock::with_lock`] instead: the guard releases on drop, which
//! covers early returns, panics, and futures dropped mid-critical-section.

use super::{BinaryLock, LockError};
use crate::task::TaskId;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Ownership {
    owner: Option<TaskId>,
    depth: usize,
}

/// A task-reentrant lock built on [`BinaryLock`]
#[derive(Debug, Default)]
pub struct ReentrantLock {
    permit: BinaryLock,
    ownership: Mutex<Ownership>,
}

impl ReentrantLock {
    pub fn new() -> Self {
        Self::default()
    }

    fn ownership(&self) -> MutexGuard<'_, Ownership> {
        self.ownership.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Acquire the lock for `task`, returning the new nesting depth
    ///
    /// Re-entry by the current owner never suspends. Any other task waits in
    /// FIFO order for the permit.
    pub async fn lock(&self, task: &TaskId) -> Result<usize, LockError> {
        if let Some(depth) = self.reenter(task) {
            return Ok(depth);
        }

        self.permit.acquire().await?;

        let mut ownership = self.ownership();
        ownership.owner = Some(task.clone());
        ownership.depth = 1;
        tracing::trace!(%task, "lock acquired");
        Ok(1)
    }

    /// Acquire the lock only if it is free or already owned by `task`
    pub fn try_lock(&self, task: &TaskId) -> Option<usize> {
        if let Some(depth) = self.reenter(task) {
            return Some(depth);
        }
        if !self.permit.try_acquire() {
            return None;
        }

        let mut ownership = self.ownership();
        ownership.owner = Some(task.clone());
        ownership.depth = 1;
        Some(1)
    }

    // Only `task` itself can make `task` the owner, so a miss here cannot
    // turn into a hit before the caller reaches the permit.
    fn reenter(&self, task: &TaskId) -> Option<usize> {
        let mut ownership = self.ownership();
        if ownership.owner.as_ref() != Some(task) {
            return None;
        }
        ownership.depth += 1;
        tracing::trace!(%task, depth = ownership.depth, "reentered");
        Some(ownership.depth)
    }

    /// Release one level of nesting held by `task`, returning the remaining depth
    ///
    /// The permit is handed on only when the depth reaches zero. A call from a
    /// task that does not own the lock fails without touching any state.
    pub fn unlock(&self, task: &TaskId) -> Result<usize, LockError> {
        let mut ownership = self.ownership();
        if ownership.owner.as_ref() != Some(task) {
            tracing::error!(%task, owner = ?ownership.owner, "unlock by non-owner");
            return Err(LockError::NotOwner {
                task: task.clone(),
                owner: ownership.owner.clone(),
            });
        }

        ownership.depth -= 1;
        if ownership.depth == 0 {
            ownership.owner = None;
            self.permit.release()?;
            tracing::trace!(%task, "lock released");
        }
        Ok(ownership.depth)
    }

    /// Acquire the lock and return a guard that releases it on drop
    pub async fn guard(&self, task: &TaskId) -> Result<ReentrantGuard<'_>, LockError> {
        let depth = self.lock(task).await?;
        Ok(ReentrantGuard {
            lock: self,
            task: task.clone(),
            depth,
        })
    }

    /// Run `action` while holding the lock
    ///
    /// The lock is released however `action` finishes: a returned value, a
    /// returned error inside `T`, a panic, or cancellation of the future.
    pub async fn with_lock<F, Fut, T>(&self, task: &TaskId, action: F) -> Result<T, LockError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.guard(task).await?;
        Ok(action().await)
    }

    /// Refuse new owners from now on
    ///
    /// Tasks waiting in [`lock`](Self::lock) fail with [`LockError::Closed`].
    /// The current owner keeps the lock and may still re-enter and unlock.
    pub fn close(&self) {
        self.permit.close();
    }

    /// The task currently owning the lock, if any
    ///
    /// During a handoff the permit is taken a moment before the new owner is
    /// recorded, so this can briefly read `None` while [`is_locked`](Self::is_locked)
    /// reads `true`. Both are snapshots for diagnostics, not for synchronization.
    pub fn owner(&self) -> Option<TaskId> {
        self.ownership().owner.clone()
    }

    /// Current nesting depth (zero when free)
    pub fn depth(&self) -> usize {
        self.ownership().depth
    }

    /// Whether any task holds the lock
    ///
    /// Tracks the permit, not the owner record; see [`owner`](Self::owner).
    pub fn is_locked(&self) -> bool {
        self.permit.is_held()
    }

    /// Whether `task` is the current owner
    pub fn is_held_by(&self, task: &TaskId) -> bool {
        self.ownership().owner.as_ref() == Some(task)
    }
}

/// Scoped acquisition of a [`ReentrantLock`]
///
/// Dropping the guard releases exactly the level of nesting it acquired.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ReentrantGuard<'a> {
    lock: &'a ReentrantLock,
    task: TaskId,
    depth: usize,
}

impl ReentrantGuard<'_> {
    /// Nesting depth this guard acquired at
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn task(&self) -> &TaskId {
        &self.task
    }
}

impl Drop for ReentrantGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.lock.unlock(&self.task) {
            tracing::error!(task = %self.task, error = %e, "guard release failed");
        }
    }
}

#[cfg(test)]
#[path = "reentrant_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binary permit with a FIFO wait queue

use super::LockError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Semaphore;

/// A counting permit of capacity one
///
/// Waiters are served strictly in arrival order. A release that finds the
/// queue non-empty hands the permit to the head waiter directly, so a task
/// arriving later can never overtake it.
///
/// The lock carries no notion of ownership; [`ReentrantLock`](super::ReentrantLock)
/// adds that on top.
#[derive(Debug)]
pub struct BinaryLock {
    permit: Semaphore,
    /// Set by the acquirer, cleared by the releaser; catches unmatched releases
    held: AtomicBool,
    /// Acquirers currently suspended in the wait queue
    queued: AtomicUsize,
}

impl BinaryLock {
    pub fn new() -> Self {
        Self {
            permit: Semaphore::new(1),
            held: AtomicBool::new(false),
            queued: AtomicUsize::new(0),
        }
    }

    /// Take the permit, suspending until it is handed over if necessary
    ///
    /// Dropping the returned future before it completes leaves the queue
    /// without consuming the permit.
    pub async fn acquire(&self) -> Result<(), LockError> {
        let permit = {
            let _slot = QueueSlot::enter(&self.queued);
            self.permit.acquire().await.map_err(|_| LockError::Closed)?
        };
        permit.forget();
        self.held.store(true, Ordering::Release);
        Ok(())
    }

    /// Take the permit only if it is free right now
    pub fn try_acquire(&self) -> bool {
        match self.permit.try_acquire() {
            Ok(permit) => {
                permit.forget();
                self.held.store(true, Ordering::Release);
                true
            }
            Err(_) => false,
        }
    }

    /// Return the permit, waking the head of the queue if there is one
    pub fn release(&self) -> Result<(), LockError> {
        if self
            .held
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::error!("binary lock released while free");
            return Err(LockError::NotHeld);
        }
        self.permit.add_permits(1);
        Ok(())
    }

    /// Shut the lock down
    ///
    /// Queued and future [`acquire`](Self::acquire) calls fail with
    /// [`LockError::Closed`] and `try_acquire` returns `false`. A current
    /// holder is unaffected and may still release.
    pub fn close(&self) {
        self.permit.close();
        tracing::debug!(queued = self.queued(), "binary lock closed");
    }

    pub fn is_closed(&self) -> bool {
        self.permit.is_closed()
    }

    /// Whether the permit is currently taken
    ///
    /// Advisory only: the answer may be stale by the time the caller acts on it.
    pub fn is_held(&self) -> bool {
        self.permit.available_permits() == 0
    }

    /// Number of acquirers waiting for the permit
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Acquire)
    }
}

impl Default for BinaryLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts a waiter for as long as its acquire future is alive
struct QueueSlot<'a>(&'a AtomicUsize);

impl<'a> QueueSlot<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
#[path = "binary_tests.rs"]
mod tests;

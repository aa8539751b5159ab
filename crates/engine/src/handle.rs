// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Settle-once result handles shared by coalesced callers

use coalesce_adapters::DeviceError;
use std::sync::Arc;
use tokio::sync::watch;

type Slot<T> = Option<Result<T, DeviceError>>;

/// Create a handle for one in-flight operation and the half that settles it
pub fn channel<T>(id: u64) -> (ResultHandle<T>, Settle<T>) {
    let (tx, rx) = watch::channel(None);
    (
        ResultHandle {
            inner: Arc::new(HandleInner { id, rx }),
        },
        Settle { id, tx },
    )
}

#[derive(Debug)]
struct HandleInner<T> {
    id: u64,
    rx: watch::Receiver<Slot<T>>,
}

/// Read side of an operation's outcome; clone it to share it
///
/// Every clone observes the same settled value. Dropping a clone, or a
/// future waiting on it, has no effect on the operation or on other clones.
#[derive(Debug)]
pub struct ResultHandle<T> {
    inner: Arc<HandleInner<T>>,
}

impl<T> Clone for ResultHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> ResultHandle<T> {
    /// Identity of the operation behind this handle
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Whether the outcome is available
    pub fn is_settled(&self) -> bool {
        self.inner.rx.borrow().is_some()
    }

    /// Whether the operation is over, settled or abandoned
    pub fn is_finished(&self) -> bool {
        self.is_settled() || self.inner.rx.has_changed().is_err()
    }

    /// Number of live clones of this handle
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Wait for the outcome
    ///
    /// Returns `None` if the settling half was dropped without a value.
    pub async fn wait(&self) -> Option<Result<T, DeviceError>> {
        let mut rx = self.inner.rx.clone();
        let settled = rx.wait_for(Option::is_some).await.ok()?;
        (*settled).clone()
    }
}

/// Write side of a [`ResultHandle`]; consumed by settling
#[derive(Debug)]
pub struct Settle<T> {
    id: u64,
    tx: watch::Sender<Slot<T>>,
}

impl<T> Settle<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Publish the outcome to every current and future waiter
    pub fn settle(self, outcome: Result<T, DeviceError>) {
        self.tx.send_replace(Some(outcome));
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight executor for blocking device requests
//!
//! Concurrent requests for the same key share one device call and one
//! outcome. The pending registry is only touched while the executor's
//! [`ReentrantLock`] is held, and that lock is never held while the device
//! runs or while a caller waits.

use crate::handle::{self, ResultHandle, Settle};
use crate::{ExecuteError, ExecutorConfig};
use coalesce_adapters::{BlockingDevice, DeviceError};
use coalesce_core::{IdGen, LockError, ReentrantLock, TaskId, UuidIdGen};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

type Registry<T> = HashMap<String, ResultHandle<T>>;

struct Shared<D: BlockingDevice, G> {
    config: ExecutorConfig,
    device: D,
    ids: G,
    lock: ReentrantLock,
    // Only locked while `lock` is held; never across an await
    registry: Mutex<Registry<D::Response>>,
    next_handle: AtomicU64,
}

/// Collapses concurrent same-key requests into one device call
///
/// Cloning is cheap; clones share the registry and the device.
pub struct CoalescingExecutor<D: BlockingDevice, G: IdGen = UuidIdGen> {
    shared: Arc<Shared<D, G>>,
}

impl<D: BlockingDevice, G: IdGen> Clone for CoalescingExecutor<D, G> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<D: BlockingDevice> CoalescingExecutor<D, UuidIdGen> {
    pub fn new(device: D, config: ExecutorConfig) -> Self {
        Self::with_id_gen(device, config, UuidIdGen)
    }
}

impl<D: BlockingDevice, G: IdGen> CoalescingExecutor<D, G> {
    /// Create an executor minting caller identities from `ids`
    pub fn with_id_gen(device: D, config: ExecutorConfig, ids: G) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                device,
                ids,
                lock: ReentrantLock::new(),
                registry: Mutex::new(HashMap::new()),
                next_handle: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.shared.config
    }

    fn registry(&self) -> MutexGuard<'_, Registry<D::Response>> {
        self.shared
            .registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Request `key`, sharing any call already in flight for it
    ///
    /// Every caller coalesced onto one call receives the same value or the
    /// same error. Dropping the returned future stops this caller waiting and
    /// nothing else.
    pub async fn request(&self, key: &str) -> Result<D::Response, ExecuteError> {
        let task = self.shared.ids.next();
        let span = tracing::info_span!(
            "coalesce.request",
            executor = %self.shared.config.name,
            key,
            task = %task,
        );
        self.request_as(&task, key).instrument(span).await
    }

    /// Request `key` in a spawned task and hand the outcome to `on_result`
    ///
    /// `on_result` runs exactly once, on a tokio worker thread, after every
    /// internal lock has been released. Aborting the returned handle cancels
    /// only this caller. Must be called from within a tokio runtime.
    pub fn submit<F>(&self, key: &str, on_result: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<D::Response, ExecuteError>) + Send + 'static,
    {
        let executor = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            let result = executor.request(&key).await;
            on_result(result);
        })
    }

    async fn request_as(&self, task: &TaskId, key: &str) -> Result<D::Response, ExecuteError> {
        let handle = self.attach_or_start(task, key).await?;

        let outcome = match self.shared.config.wait_timeout {
            Some(after) => match tokio::time::timeout(after, handle.wait()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(
                        timeout_ms = after.as_millis() as u64,
                        "stopped waiting for result"
                    );
                    self.detach(task, key, &handle).await?;
                    return Err(ExecuteError::TimedOut {
                        key: key.to_string(),
                        after,
                    });
                }
            },
            None => handle.wait().await,
        };

        self.detach(task, key, &handle).await?;

        match outcome {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => {
                tracing::debug!(error = %e, "request failed");
                Err(ExecuteError::Device(e))
            }
            None => Err(ExecuteError::Abandoned {
                key: key.to_string(),
            }),
        }
    }

    /// Join the in-flight call for `key`, or register and start a new one
    async fn attach_or_start(
        &self,
        task: &TaskId,
        key: &str,
    ) -> Result<ResultHandle<D::Response>, LockError> {
        let _guard = self.shared.lock.guard(task).await?;
        let mut registry = self.registry();

        if let Some(existing) = registry.get(key) {
            if !existing.is_finished() {
                tracing::debug!(handle = existing.id(), "attached to in-flight request");
                return Ok(existing.clone());
            }
            tracing::debug!(handle = existing.id(), "replacing finished entry");
        }

        let id = self.shared.next_handle.fetch_add(1, Ordering::Relaxed);
        let (handle, settle) = handle::channel(id);
        registry.insert(key.to_string(), handle.clone());
        drop(registry);

        tracing::debug!(handle = id, "started request");
        self.start(key, settle);
        Ok(handle)
    }

    fn start(&self, key: &str, settle: Settle<D::Response>) {
        let span = tracing::info_span!(
            "coalesce.operation",
            executor = %self.shared.config.name,
            key,
            handle = settle.id(),
        );
        let executor = self.clone();
        let key = key.to_string();
        tokio::spawn(async move { executor.run_operation(key, settle).await }.instrument(span));
    }

    async fn run_operation(self, key: String, settle: Settle<D::Response>) {
        let device = self.shared.device.clone();
        let span = tracing::Span::current();
        let call_key = key.clone();

        let outcome =
            match tokio::task::spawn_blocking(move || {
                span.in_scope(|| device.perform_request(&call_key))
            })
            .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "device call did not complete");
                    Err(join_failure(e))
                }
            };

        // Unregister before settling: the entry lives exactly as long as the call
        let task = self.shared.ids.next();
        if let Err(e) = self.retire(&task, &key, settle.id()).await {
            tracing::error!(error = %e, "failed to unregister request");
        }
        settle.settle(outcome);
    }

    /// Remove the entry for `key` if it still belongs to operation `id`
    async fn retire(&self, task: &TaskId, key: &str, id: u64) -> Result<bool, LockError> {
        let _guard = self.shared.lock.guard(task).await?;
        let mut registry = self.registry();
        if registry.get(key).is_some_and(|h| h.id() == id) {
            registry.remove(key);
            tracing::debug!(handle = id, "unregistered request");
            return Ok(true);
        }
        Ok(false)
    }

    /// Caller-side cleanup once waiting is over
    ///
    /// Only removes the entry if it is the handle this caller waited on and
    /// that operation has finished; a newer call for the same key, or one
    /// still running for other callers, is left alone.
    async fn detach(
        &self,
        task: &TaskId,
        key: &str,
        handle: &ResultHandle<D::Response>,
    ) -> Result<(), LockError> {
        let _guard = self.shared.lock.guard(task).await?;
        let mut registry = self.registry();
        if registry
            .get(key)
            .is_some_and(|h| h.id() == handle.id() && h.is_finished())
        {
            registry.remove(key);
            tracing::debug!(handle = handle.id(), "removed finished entry");
        }
        Ok(())
    }

    /// Number of keys with a call in flight
    pub async fn pending_count(&self) -> Result<usize, ExecuteError> {
        let task = self.shared.ids.next();
        let _guard = self.shared.lock.guard(&task).await?;
        let count = self.registry().len();
        Ok(count)
    }

    /// Whether a call for `key` is in flight
    pub async fn is_pending(&self, key: &str) -> Result<bool, ExecuteError> {
        let task = self.shared.ids.next();
        let _guard = self.shared.lock.guard(&task).await?;
        let pending = self.registry().contains_key(key);
        Ok(pending)
    }

    /// Keys with a call in flight, sorted
    pub async fn pending_keys(&self) -> Result<Vec<String>, ExecuteError> {
        let task = self.shared.ids.next();
        let _guard = self.shared.lock.guard(&task).await?;
        let mut keys: Vec<_> = self.registry().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Callers currently waiting on the call for `key`
    pub async fn subscribers(&self, key: &str) -> Result<Option<usize>, ExecuteError> {
        let task = self.shared.ids.next();
        let _guard = self.shared.lock.guard(&task).await?;
        // The registry's own copy is not a subscriber
        let count = self.registry().get(key).map(|h| h.holders() - 1);
        Ok(count)
    }
}

fn join_failure(err: JoinError) -> DeviceError {
    if !err.is_panic() {
        return DeviceError::Unavailable(err.to_string());
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    DeviceError::Panicked(message)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;

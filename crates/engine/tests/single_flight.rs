// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight behavior through the public API

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use coalesce_adapters::{DeviceError, FakeDevice, TracedDevice};
use coalesce_core::SequentialIdGen;
use coalesce_engine::{CoalescingExecutor, ExecuteError, ExecutorConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

async fn until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_requests_through_traced_device_share_one_call() {
    let device = FakeDevice::new().with_delay(Duration::from_millis(100));
    let executor = CoalescingExecutor::with_id_gen(
        TracedDevice::new(device.clone()),
        ExecutorConfig::new("integration"),
        SequentialIdGen::new("caller"),
    );
    let barrier = Arc::new(Barrier::new(10));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let executor = executor.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                executor.request("https://example.com").await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(
            handle.await.unwrap().unwrap(),
            "response #1 for https://example.com"
        );
    }
    assert_eq!(device.calls_for("https://example.com"), 1);
    assert_eq!(executor.pending_count().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failure_then_retry_reaches_device_again() {
    let device = FakeDevice::new();
    device.respond("k", Err(DeviceError::Unavailable("offline".to_string())));
    let executor = CoalescingExecutor::new(device.clone(), ExecutorConfig::default());

    let err = executor.request("k").await.unwrap_err();
    assert_eq!(
        err,
        ExecuteError::Device(DeviceError::Unavailable("offline".to_string()))
    );
    assert_eq!(err.to_string(), "device error: device unavailable: offline");

    // Errors are not cached: the next request is a fresh call
    device.respond("k", Ok("back".to_string()));
    assert_eq!(executor.request("k").await.unwrap(), "back");
    assert_eq!(device.calls_for("k"), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn entry_is_removed_even_when_every_caller_is_cancelled() {
    let device = FakeDevice::gated();
    let executor = CoalescingExecutor::new(device.clone(), ExecutorConfig::default());

    let handles: Vec<_> = (0..3).map(|_| executor.submit("k", |_| {})).collect();
    until(|| device.calls_for("k") == 1).await;
    for handle in &handles {
        handle.abort();
    }
    for handle in handles {
        assert!(handle.await.unwrap_err().is_cancelled());
    }
    assert!(executor.is_pending("k").await.unwrap());

    device.open_gate();
    tokio::time::timeout(Duration::from_secs(5), async {
        while executor.is_pending("k").await.unwrap() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(device.calls_for("k"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn callbacks_run_after_locks_are_released() {
    let executor = CoalescingExecutor::new(FakeDevice::new(), ExecutorConfig::default());
    let (tx, rx) = tokio::sync::oneshot::channel();

    let inner = executor.clone();
    executor
        .submit("k", move |_| {
            let _ = tx.send(inner);
        })
        .await
        .unwrap();

    let inner = rx.await.unwrap();
    let pending = tokio::time::timeout(Duration::from_millis(500), inner.pending_count())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pending, 0);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::device::{BlockingDevice, DeviceError};

/// Wrapper that adds tracing to any BlockingDevice
#[derive(Clone, Debug)]
pub struct TracedDevice<D> {
    inner: D,
}

impl<D> TracedDevice<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    /// The wrapped device
    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: BlockingDevice> BlockingDevice for TracedDevice<D> {
    type Response = D::Response;

    fn perform_request(&self, key: &str) -> Result<D::Response, DeviceError> {
        let span = tracing::info_span!("device.request", key);
        let _guard = span.enter();

        tracing::info!("starting");

        let start = std::time::Instant::now();
        let result = self.inner.perform_request(key);
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "completed"),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "request failed"
            ),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

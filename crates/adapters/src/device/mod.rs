// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking device adapters

mod simulated;

pub use simulated::{SimulatedDevice, SimulatedDeviceConfig};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DeviceCall, FakeDevice};

use thiserror::Error;

/// Errors from device requests
///
/// Cloneable so that one failure can be handed verbatim to every caller
/// waiting on the same request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("request failed: {0}")]
    Failed(String),
    #[error("device unavailable: {0}")]
    Unavailable(String),
    #[error("device call panicked: {0}")]
    Panicked(String),
}

/// A device answering keyed requests synchronously
///
/// Calls may block the calling thread for a long time; callers are expected
/// to run them off the async executor.
pub trait BlockingDevice: Clone + Send + Sync + 'static {
    /// Value produced by a successful request
    type Response: Clone + Send + Sync + 'static;

    /// Perform one request for `key`
    fn perform_request(&self, key: &str) -> Result<Self::Response, DeviceError>;
}

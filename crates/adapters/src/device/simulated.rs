// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulated slow device
//!
//! Stands in for a hardware transport: every request sleeps the calling
//! thread for a configured latency before answering.

use super::{BlockingDevice, DeviceError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Simulated device configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedDeviceConfig {
    /// How long each request blocks
    #[serde(with = "humantime_serde")]
    pub latency: Duration,
    /// Keys whose requests always fail
    pub fail_keys: Vec<String>,
}

impl Default for SimulatedDeviceConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(1000),
            fail_keys: Vec::new(),
        }
    }
}

impl SimulatedDeviceConfig {
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_fail_key(mut self, key: impl Into<String>) -> Self {
        self.fail_keys.push(key.into());
        self
    }
}

/// Device that sleeps, then answers `"Synchronous response from {key}"`
#[derive(Clone, Debug)]
pub struct SimulatedDevice {
    latency: Duration,
    fail_keys: Arc<HashSet<String>>,
    calls: Arc<Mutex<BTreeMap<String, u64>>>,
}

impl SimulatedDevice {
    pub fn new(config: SimulatedDeviceConfig) -> Self {
        Self {
            latency: config.latency,
            fail_keys: Arc::new(config.fail_keys.into_iter().collect()),
            calls: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Number of requests performed for `key`
    pub fn calls_for(&self, key: &str) -> u64 {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Requests performed so far, per key
    pub fn calls(&self) -> BTreeMap<String, u64> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new(SimulatedDeviceConfig::default())
    }
}

impl BlockingDevice for SimulatedDevice {
    type Response = String;

    fn perform_request(&self, key: &str) -> Result<String, DeviceError> {
        *self
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(key.to_string())
            .or_insert(0) += 1;

        std::thread::sleep(self.latency);

        if self.fail_keys.contains(key) {
            return Err(DeviceError::Failed(format!("simulated failure for {}", key)));
        }
        Ok(format!("Synchronous response from {}", key))
    }
}

#[cfg(test)]
#[path = "simulated_tests.rs"]
mod tests;

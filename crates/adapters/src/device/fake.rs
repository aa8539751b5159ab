// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake device for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BlockingDevice, DeviceError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Recorded device call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCall {
    pub key: String,
    /// Position of this call among all calls, starting at 1
    pub seq: u64,
}

#[derive(Debug)]
struct Gate {
    open: Mutex<bool>,
    opened: Condvar,
}

impl Gate {
    fn new(open: bool) -> Self {
        Self {
            open: Mutex::new(open),
            opened: Condvar::new(),
        }
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap_or_else(|e| e.into_inner());
        while !*open {
            open = self.opened.wait(open).unwrap_or_else(|e| e.into_inner());
        }
    }

    fn set(&self, value: bool) {
        *self.open.lock().unwrap_or_else(|e| e.into_inner()) = value;
        if value {
            self.opened.notify_all();
        }
    }
}

/// Fake blocking device for testing
///
/// Unscripted keys answer `"response #{seq} for {key}"`, so two callers
/// holding the same string provably shared one call.
#[derive(Clone)]
pub struct FakeDevice {
    calls: Arc<Mutex<Vec<DeviceCall>>>,
    scripted: Arc<Mutex<HashMap<String, Result<String, DeviceError>>>>,
    panic_keys: Arc<Mutex<HashSet<String>>>,
    delay: Duration,
    gate: Arc<Gate>,
}

impl Default for FakeDevice {
    fn default() -> Self {
        Self {
            calls: Arc::default(),
            scripted: Arc::default(),
            panic_keys: Arc::default(),
            delay: Duration::ZERO,
            gate: Arc::new(Gate::new(true)),
        }
    }
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device whose calls block until [`FakeDevice::open_gate`] is called
    pub fn gated() -> Self {
        Self {
            gate: Arc::new(Gate::new(false)),
            ..Self::default()
        }
    }

    /// Sleep this long inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Script the outcome for `key`
    pub fn respond(&self, key: &str, outcome: Result<String, DeviceError>) {
        self.scripted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), outcome);
    }

    /// Make calls for `key` panic
    pub fn panic_on(&self, key: &str) {
        self.panic_keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string());
    }

    /// Let blocked and future calls proceed
    pub fn open_gate(&self) {
        self.gate.set(true);
    }

    /// Block future calls again
    pub fn close_gate(&self) {
        self.gate.set(false);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of calls made for `key`
    pub fn calls_for(&self, key: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| c.key == key)
            .count()
    }
}

impl BlockingDevice for FakeDevice {
    type Response = String;

    #[allow(clippy::panic)]
    fn perform_request(&self, key: &str) -> Result<String, DeviceError> {
        let seq = {
            let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
            let seq = calls.len() as u64 + 1;
            calls.push(DeviceCall {
                key: key.to_string(),
                seq,
            });
            seq
        };

        self.gate.wait();
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        if self
            .panic_keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
        {
            panic!("fake device panic for {}", key);
        }

        let scripted = self
            .scripted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned();
        scripted.unwrap_or_else(|| Ok(format!("response #{} for {}", seq, key)))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

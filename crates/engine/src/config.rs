// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coalescing executor configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Name identifying this executor in logs
    pub name: String,
    /// How long a single caller waits for a result before giving up
    ///
    /// Giving up only detaches that caller; the request keeps running for
    /// everyone else.
    #[serde(with = "humantime_serde")]
    pub wait_timeout: Option<Duration>,
}

impl ExecutorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wait_timeout: None,
        }
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::new("executor")
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the coalescing executor

use coalesce_adapters::DeviceError;
use coalesce_core::LockError;
use std::time::Duration;
use thiserror::Error;

/// Errors delivered to a caller of the executor
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecuteError {
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
    #[error("lock error: {0}")]
    Lock(#[from] LockError),
    #[error("request for {key} ended without a result")]
    Abandoned { key: String },
    #[error("gave up waiting for {key} after {}", humantime::format_duration(*.after))]
    TimedOut { key: String, after: Duration },
}

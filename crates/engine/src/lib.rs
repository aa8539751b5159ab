// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Request-coalescing executor

mod config;
mod error;
mod executor;
pub mod handle;

pub use config::ExecutorConfig;
pub use error::ExecuteError;
pub use executor::CoalescingExecutor;
pub use handle::{ResultHandle, Settle};

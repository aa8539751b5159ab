// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identity and identity generation
//!
//! A [`TaskId`] is the opaque token a unit of work presents to the locks in
//! this crate. Identities are minted by an [`IdGen`] and passed explicitly;
//! nothing here inspects runtime-native task handles.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identity of the unit of work currently holding (or requesting) a lock
///
/// Two calls made with equal `TaskId`s are treated as the same task, so an
/// identity must never be shared between concurrently running tasks.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates unique task identities
pub trait IdGen: Clone + Send + Sync + 'static {
    fn next(&self) -> TaskId;
}

/// UUID-based generator for production use
#[derive(Clone, Debug, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> TaskId {
        TaskId(uuid::Uuid::new_v4().to_string())
    }
}

/// Sequential generator for testing
#[derive(Clone, Debug)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("task")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> TaskId {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        TaskId(format!("{}-{}", self.prefix, n))
    }
}

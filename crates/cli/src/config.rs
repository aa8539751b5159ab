// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config file loading

use crate::error::CliError;
use coalesce_adapters::SimulatedDeviceConfig;
use coalesce_engine::ExecutorConfig;
use serde::Deserialize;
use std::path::Path;

/// Contents of a `--config` file; both tables are optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub executor: ExecutorConfig,
    pub device: SimulatedDeviceConfig,
}

impl Config {
    /// Load `path`, or the defaults when no file was given
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content =
            std::fs::read_to_string(path).map_err(|e| CliError::config_unreadable(path, e))?;
        Self::parse(&content).map_err(|e| CliError::config_invalid(path, e))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

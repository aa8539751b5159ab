// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Instant;

fn fast() -> SimulatedDeviceConfig {
    SimulatedDeviceConfig::default().with_latency(Duration::from_millis(5))
}

#[test]
fn answers_with_key() {
    let device = SimulatedDevice::new(fast());
    assert_eq!(
        device.perform_request("https://example.com").unwrap(),
        "Synchronous response from https://example.com"
    );
}

#[test]
fn blocks_for_configured_latency() {
    let device = SimulatedDevice::new(
        SimulatedDeviceConfig::default().with_latency(Duration::from_millis(30)),
    );
    let start = Instant::now();
    device.perform_request("k").unwrap();
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn configured_keys_fail() {
    let device = SimulatedDevice::new(fast().with_fail_key("bad"));
    assert_eq!(
        device.perform_request("bad"),
        Err(DeviceError::Failed("simulated failure for bad".to_string()))
    );
    assert!(device.perform_request("good").is_ok());
}

#[test]
fn counts_calls_per_key_across_clones() {
    let device = SimulatedDevice::new(fast().with_fail_key("b"));
    let clone = device.clone();

    device.perform_request("a").unwrap();
    clone.perform_request("a").unwrap();
    let _ = clone.perform_request("b");

    assert_eq!(device.calls_for("a"), 2);
    assert_eq!(device.calls_for("b"), 1);
    assert_eq!(device.calls_for("c"), 0);
    assert_eq!(device.calls().len(), 2);
}

#[test]
fn config_parses_human_durations() {
    let config: SimulatedDeviceConfig =
        toml::from_str("latency = \"250ms\"\nfail_keys = [\"x\"]\n").unwrap();
    assert_eq!(config.latency, Duration::from_millis(250));
    assert_eq!(config.fail_keys, vec!["x".to_string()]);

    let defaults: SimulatedDeviceConfig = toml::from_str("").unwrap();
    assert_eq!(defaults, SimulatedDeviceConfig::default());
}

//! Burst coalescing specs
//!
//! Many concurrent callers per key collapse into one device call.

use crate::prelude::*;

#[test]
fn callers_share_one_device_call() {
    Project::empty()
        .coalesce()
        .args(&["burst", "--key", "a", "--callers", "16", "--latency", "200ms"])
        .passes()
        .stdout_has("callers=16")
        .stdout_has("device_calls=1")
        .stdout_has("outcomes=1")
        .stdout_has("Synchronous response from a")
        .stdout_has("total device calls: 1");
}

#[test]
fn distinct_keys_each_get_a_call() {
    Project::empty()
        .coalesce()
        .args(&[
            "burst", "--key", "a", "b", "c", "--callers", "4", "--latency", "100ms",
        ])
        .passes()
        .stdout_has("Synchronous response from a")
        .stdout_has("Synchronous response from b")
        .stdout_has("Synchronous response from c")
        .stdout_has("total device calls: 3");
}

#[test]
fn each_round_starts_a_fresh_call() {
    Project::empty()
        .coalesce()
        .args(&[
            "burst", "--key", "a", "--callers", "4", "--latency", "50ms", "--rounds", "3",
        ])
        .passes()
        .stdout_has("round 3")
        .stdout_has("total device calls: 3");
}

#[test]
fn json_report_is_structured() {
    let run = Project::empty()
        .coalesce()
        .args(&[
            "burst", "--key", "a", "--callers", "5", "--latency", "100ms", "--format", "json",
        ])
        .passes();

    let report = run.stdout_json();
    let key = &report["rounds"][0]["keys"][0];
    assert_eq!(key["key"], "a");
    assert_eq!(key["callers"], 5);
    assert_eq!(key["device_calls"], 1);
    assert_eq!(key["distinct_outcomes"], 1);
    assert_eq!(report["total_device_calls"], 1);
}

#[test]
fn verbose_logs_go_to_stderr() {
    Project::empty()
        .coalesce()
        .args(&["-vv", "burst", "--key", "a", "--latency", "10ms"])
        .passes()
        .stderr_has("device.request")
        .stdout_lacks("device.request");
}

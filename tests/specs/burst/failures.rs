//! Burst failure specs
//!
//! A failing device call reaches every coalesced caller.

use crate::prelude::*;

#[test]
fn failure_fans_out_to_every_caller() {
    Project::empty()
        .coalesce()
        .args(&[
            "burst", "--key", "bad", "--fail", "bad", "--callers", "6", "--latency", "100ms",
        ])
        .passes()
        .stdout_has("callers=6")
        .stdout_has("device_calls=1")
        .stdout_has("outcomes=1")
        .stdout_has("simulated failure for bad");
}

#[test]
fn failing_key_does_not_affect_others() {
    Project::empty()
        .coalesce()
        .args(&[
            "burst", "--key", "bad", "good", "--fail", "bad", "--latency", "50ms",
        ])
        .passes()
        .stdout_has("simulated failure for bad")
        .stdout_has("Synchronous response from good");
}

#[test]
fn impatient_callers_give_up_without_cancelling() {
    Project::empty()
        .coalesce()
        .args(&[
            "burst", "--key", "slow", "--callers", "3", "--latency", "300ms", "--timeout", "20ms",
        ])
        .passes()
        .stdout_has("gave up waiting for slow after 20ms")
        .stdout_has("device_calls=1");
}

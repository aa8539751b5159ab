//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    Project::empty()
        .coalesce()
        .args(&["--help"])
        .passes()
        .stdout_has("burst")
        .stdout_has("bank")
        .stdout_has("--config");
}

#[test]
fn burst_help_lists_options() {
    Project::empty()
        .coalesce()
        .args(&["burst", "--help"])
        .passes()
        .stdout_has("--key")
        .stdout_has("--callers")
        .stdout_has("--latency");
}

#[test]
fn missing_subcommand_fails() {
    Project::empty().coalesce().args(&[]).fails().stderr_has("Usage");
}

#[test]
fn burst_requires_a_key() {
    Project::empty()
        .coalesce()
        .args(&["burst"])
        .fails()
        .stderr_has("--key");
}

#[test]
fn zero_callers_is_rejected() {
    Project::empty()
        .coalesce()
        .args(&["burst", "--key", "a", "--callers", "0"])
        .fails();
}

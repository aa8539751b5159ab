//! Config file specs

use crate::prelude::*;

#[test]
fn config_file_sets_device_failures() {
    let temp = Project::empty();
    temp.file(
        "coalesce.toml",
        r#"
[device]
latency = "20ms"
fail_keys = ["down"]
"#,
    );

    temp.coalesce()
        .args(&["--config", "coalesce.toml", "burst", "--key", "down", "--callers", "3"])
        .passes()
        .stdout_has("error: device error: request failed: simulated failure for down");
}

#[test]
fn flags_override_config_file() {
    let temp = Project::empty();
    temp.file("coalesce.toml", "[device]\nlatency = \"1h\"\n");

    // Would hang for an hour if the file's latency won
    temp.coalesce()
        .args(&["--config", "coalesce.toml", "burst", "--key", "a", "--latency", "10ms"])
        .passes()
        .stdout_has("Synchronous response from a");
}

#[test]
fn missing_config_file_explains_itself() {
    Project::empty()
        .coalesce()
        .args(&["--config", "nope.toml", "bank"])
        .fails()
        .stderr_has("cannot read config file")
        .stderr_has("suggestions:");
}

#[test]
fn unknown_config_table_is_rejected() {
    let temp = Project::empty();
    temp.file("coalesce.toml", "[devise]\nlatency = \"10ms\"\n");

    temp.coalesce()
        .args(&["--config", "coalesce.toml", "bank"])
        .fails()
        .stderr_has("invalid config file");
}

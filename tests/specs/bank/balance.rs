//! Bank specs
//!
//! Deposits log the balance by re-entering the account lock.

use crate::prelude::*;

#[test]
fn default_run_ends_at_120() {
    Project::empty()
        .coalesce()
        .args(&["bank"])
        .passes()
        .stdout_has("opening balance: 100")
        .stdout_has("DEPOSIT")
        .stdout_has("WITHDRAW")
        .stdout_has("final balance: 120");
}

#[test]
fn overdraft_is_rejected() {
    Project::empty()
        .coalesce()
        .args(&["bank", "--base", "10", "--deposit", "5", "--withdraw", "100"])
        .passes()
        .stdout_has("withdrawal rejected")
        .stdout_has("final balance: 15");
}

#[test]
fn json_report_lists_transactions() {
    let run = Project::empty()
        .coalesce()
        .args(&["bank", "--format", "json"])
        .passes();

    let report = run.stdout_json();
    assert_eq!(report["final_balance"], 120);
    assert_eq!(report["transactions"].as_array().unwrap().len(), 2);
    assert_eq!(report["withdraw_applied"], true);
}

#[test]
fn overflowing_deposit_fails_cleanly() {
    Project::empty()
        .coalesce()
        .args(&[
            "bank",
            "--base",
            "9223372036854775807",
            "--deposit",
            "1",
            "--withdraw",
            "0",
        ])
        .fails()
        .stderr_has("balance overflow")
        .stderr_lacks("panicked");
}

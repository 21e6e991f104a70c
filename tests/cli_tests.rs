//! Binary smoke tests for argument handling.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_describes_the_release_arguments() {
    Command::cargo_bin("terra_release")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ENVIRONMENT"))
        .stdout(predicate::str::contains("--channel"));
}

#[test]
fn missing_environment_is_a_usage_error() {
    Command::cargo_bin("terra_release")
        .unwrap()
        .env_remove("RELEASE_CHANNEL")
        .assert()
        .failure();
}

#[test]
fn malformed_version_is_rejected_at_the_boundary() {
    Command::cargo_bin("terra_release")
        .unwrap()
        .args(["kraken", "not-a-version", "--channel", "C123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-a-version"));
}

//! Integration tests for the CLI surface

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_exits_with_usage_code() {
    let mut cmd = Command::cargo_bin("synfrag").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .code(2)
        .stdout(predicate::str::contains("synfrag"))
        .stdout(predicate::str::contains("v4-frag-tcp"))
        .stdout(predicate::str::contains("v6-frag-optioned-icmp6"));
}

#[test]
fn test_short_help_exits_with_usage_code() {
    let mut cmd = Command::cargo_bin("synfrag").unwrap();
    cmd.arg("-h");
    cmd.assert().code(2);
}

#[test]
fn test_version_exits_zero() {
    let mut cmd = Command::cargo_bin("synfrag").unwrap();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("synfrag"));
}

#[test]
fn test_no_arguments_is_usage_error() {
    let mut cmd = Command::cargo_bin("synfrag").unwrap();
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_unknown_test_name_is_usage_error() {
    let mut cmd = Command::cargo_bin("synfrag").unwrap();
    cmd.args([
        "--srcip",
        "10.0.0.1",
        "--dstip",
        "10.0.0.2",
        "--dstmac",
        "aa:bb:cc:dd:ee:ff",
        "--interface",
        "eth0",
        "--test",
        "v4-jumbo-tcp",
        "--dstport",
        "80",
    ]);
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("unknown test type"));
}

#[test]
fn test_invalid_port_is_usage_error() {
    let mut cmd = Command::cargo_bin("synfrag").unwrap();
    cmd.args([
        "--srcip",
        "10.0.0.1",
        "--dstip",
        "10.0.0.2",
        "--dstmac",
        "aa:bb:cc:dd:ee:ff",
        "--interface",
        "eth0",
        "--test",
        "v4-tcp",
        "--dstport",
        "0",
    ]);
    cmd.assert().code(2);
}

#[test]
fn test_malformed_address_is_usage_error() {
    let mut cmd = Command::cargo_bin("synfrag").unwrap();
    cmd.args([
        "--srcip",
        "not-an-address",
        "--dstip",
        "10.0.0.2",
        "--dstmac",
        "aa:bb:cc:dd:ee:ff",
        "--interface",
        "eth0",
        "--test",
        "v4-tcp",
        "--dstport",
        "80",
    ]);
    cmd.assert().code(2);
}

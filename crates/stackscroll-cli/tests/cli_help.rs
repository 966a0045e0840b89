use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("stackscroll")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("share"));
}

#[test]
fn test_publish_requires_a_body() {
    cargo_bin_cmd!("stackscroll")
        .args(["publish", "--title", "Hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--body"));
}

#[test]
fn test_share_help_shows_flags() {
    cargo_bin_cmd!("stackscroll")
        .args(["share", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-copy"))
        .stdout(predicate::str::contains("--open"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("stackscroll")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("stackscroll")
        .env("STACKSCROLL_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("stackscroll")
        .env("STACKSCROLL_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("table = \"posts\""));
    assert!(contents.contains("origin ="));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("stackscroll")
        .env("STACKSCROLL_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_commands_ignore_broken_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "this is = = not toml").unwrap();

    cargo_bin_cmd!("stackscroll")
        .env("STACKSCROLL_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success();
}

#[test]
fn test_missing_backend_url_is_reported() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("stackscroll")
        .env("STACKSCROLL_HOME", dir.path())
        .env_remove("STACKSCROLL_SUPABASE_URL")
        .env_remove("STACKSCROLL_SUPABASE_ANON_KEY")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No backend URL configured"));
}

//! CLI end-to-end tests
//!
//! Tests for the psperf command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the psperf binary
#[allow(deprecated)]
fn psperf_cmd() -> Command {
    Command::cargo_bin("psperf").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    psperf_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_lists_commands() {
    psperf_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_cli_version_command() {
    psperf_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("psperf"));
}

#[test]
fn test_cli_validate_good_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[server]\nport = 9100\n\n[catalog]\npage_size = 12\n").unwrap();

    psperf_cmd()
        .env_remove("PORT")
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("9100"));
}

#[test]
fn test_cli_validate_bad_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[catalog]\npage_size = 0\n").unwrap();

    psperf_cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("page_size"));
}

#[test]
fn test_cli_search_rejects_unknown_console() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let db = dir.path().join("games.sqlite");
    fs::write(
        &path,
        format!("[database]\npath = {:?}\n", db.to_string_lossy()),
    )
    .unwrap();

    psperf_cmd()
        .arg("--config")
        .arg(&path)
        .arg("search")
        .arg("Halo")
        .arg("--console")
        .arg("Dreamcast")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown platform"));
}

use assert_cmd::cargo; // handy crate for testing CLIs
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A `prai` command isolated from the user's config, key and locale.
fn prai(config_dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!();
    cmd.env("PRAI_CONFIG", config_dir.path().join("config.json"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("LC_ALL")
        .env_remove("LC_MESSAGES")
        .env("LANG", "ja_JP.UTF-8")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn prints_help() {
    let mut cmd = cargo::cargo_bin_cmd!();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn prints_subcommand_help() {
    let mut cmd = cargo::cargo_bin_cmd!();

    cmd.args(["create", "-h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--base"));
}

#[test]
fn prints_version() {
    let mut cmd = cargo::cargo_bin_cmd!();

    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_command_exits_1() {
    let mut cmd = cargo::cargo_bin_cmd!();

    cmd.arg("frobnicate").assert().code(1);
}

#[test]
fn config_show_prints_locale_defaults() {
    let dir = TempDir::new().unwrap();

    prai(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("language: ja"))
        .stdout(predicate::str::contains("template: default"))
        .stdout(predicate::str::contains("api_key: (not set)"));
}

#[test]
fn config_set_persists_and_masks_key() {
    let dir = TempDir::new().unwrap();

    prai(&dir)
        .args(["config", "api_key", "sk-secret-value"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration updated: api_key"));

    prai(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api_key: sk-****"))
        .stdout(predicate::str::contains("sk-secret-value").not());

    let stored = fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert!(stored.contains("\"api_key\": \"sk-secret-value\""));
}

#[test]
fn config_unknown_key_fails_without_writing() {
    let dir = TempDir::new().unwrap();

    prai(&dir)
        .args(["config", "bogus", "x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown configuration key: bogus"));

    assert!(!dir.path().join("config.json").exists());
}

#[test]
fn config_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();

    prai(&dir).args(["config", "language", "fr"]).assert().success();
    prai(&dir)
        .args(["config", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reset"));

    prai(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("language: ja"));
}

#[test]
fn config_without_arguments_is_a_usage_error() {
    let dir = TempDir::new().unwrap();

    prai(&dir).arg("config").assert().code(1);
    prai(&dir).args(["config", "language"]).assert().code(1);
    prai(&dir).args(["config", "show", "extra"]).assert().code(1);
}

#[test]
fn create_without_api_key_fails_fast() {
    let dir = TempDir::new().unwrap();

    prai(&dir)
        .args(["create", "--base", "main"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("OpenAI API key is not set"));
}

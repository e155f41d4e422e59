#![allow(deprecated)] // cargo_bin is fine for a single-binary crate

use assert_cmd::Command;
use predicates::prelude::*;

fn catalog() -> Command {
    let mut cmd = Command::cargo_bin("catalog").unwrap();
    // keep the host's config out of the way
    cmd.env_remove("CATALOGFLOW_CONFIG_PATH")
        .env_remove("CATALOGFLOW_REGION");
    cmd
}

/// Help lists every subcommand
#[test]
fn test_cli_help() {
    catalog()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Service Catalog"))
        .stdout(predicate::str::contains("products"))
        .stdout(predicate::str::contains("params"))
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("provisioned"))
        .stdout(predicate::str::contains("terminate"))
        .stdout(predicate::str::contains("record"));
}

#[test]
fn test_cli_version() {
    catalog()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("catalogflow"));
}

#[test]
fn test_provision_help() {
    catalog()
        .arg("provision")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<PRODUCT>"))
        .stdout(predicate::str::contains("KEY=VALUE"))
        .stdout(predicate::str::contains("--token"));
}

#[test]
fn test_provision_rejects_malformed_param() {
    catalog()
        .args(["provision", "p1", "a1", "lp1", "web", "-p", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn test_terminate_requires_token() {
    catalog()
        .args(["terminate", "web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TOKEN>"));
}

/// A broken config file is reported before any remote call
#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("catalog.yaml");
    std::fs::write(&config_path, "product_concurrency: 0\n").unwrap();

    catalog()
        .env("CATALOGFLOW_CONFIG_PATH", &config_path)
        .arg("products")
        .assert()
        .failure()
        .stderr(predicate::str::contains("product_concurrency"));
}

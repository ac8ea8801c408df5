//! Binary contract: output bytes and exit codes.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn geecache() -> Command {
    let mut cmd = Command::cargo_bin("geecache").unwrap();
    cmd.env_remove("GEECACHE_CONFIG")
        .env_remove("GEECACHE_ADDR")
        .env_remove("GEECACHE_BASE_PATH")
        .env("RUST_LOG", "warn");
    cmd
}

fn write_node(dir: &std::path::Path, groups: &str) -> std::path::PathBuf {
    fs::write(dir.join("scores.yaml"), "Tom: 630\nJack: 589\n").unwrap();
    let path = dir.join("node.yaml");
    fs::write(&path, format!("addr: 127.0.0.1:0\ngroups:\n{groups}")).unwrap();
    path
}

const SCORES: &str = "  - name: scores\n    source: { kind: map, path: scores.yaml }\n";

#[test]
fn get_prints_value_bytes() {
    let dir = tempdir().unwrap();
    let config = write_node(dir.path(), SCORES);

    geecache()
        .args(["get", "-c"])
        .arg(&config)
        .args(["scores", "Tom"])
        .assert()
        .success()
        .stdout("630");
}

#[test]
fn get_missing_key_is_load_failure() {
    let dir = tempdir().unwrap();
    let config = write_node(dir.path(), SCORES);

    geecache()
        .args(["get", "-c"])
        .arg(&config)
        .args(["scores", "Kate"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Kate not exist"));
}

#[test]
fn get_unknown_group_fails() {
    let dir = tempdir().unwrap();
    let config = write_node(dir.path(), SCORES);

    geecache()
        .args(["get", "-c"])
        .arg(&config)
        .args(["nope", "Tom"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no such group"));
}

#[test]
fn group_without_source_is_config_error() {
    let dir = tempdir().unwrap();
    let config = write_node(dir.path(), "  - name: scores\n");

    geecache()
        .args(["get", "-c"])
        .arg(&config)
        .args(["scores", "Tom"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("has no source"));
}

#[test]
fn serve_rejects_bad_base_path_before_binding() {
    let dir = tempdir().unwrap();
    let config = write_node(dir.path(), SCORES);

    geecache()
        .args(["serve", "-c"])
        .arg(&config)
        .args(["--base-path", "no-slashes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("base path"));
}

#[test]
fn missing_config_file_is_config_error() {
    let dir = tempdir().unwrap();

    geecache()
        .args(["get", "-c"])
        .arg(dir.path().join("absent.yaml"))
        .args(["scores", "Tom"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read config"));
}

#[test]
fn env_base_path_is_validated_like_the_file() {
    let dir = tempdir().unwrap();
    let config = write_node(dir.path(), SCORES);

    geecache()
        .env("GEECACHE_BASE_PATH", "no-slashes")
        .args(["get", "-c"])
        .arg(&config)
        .args(["scores", "Tom"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("base path"));
}

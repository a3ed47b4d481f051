//! Regression tests for the startup sequence.
//!
//! These tests run the real binary and verify that configuration loading,
//! argument validation and the maintenance flags all resolve before any
//! browser work begins. None of them should ever launch a browser: every
//! invocation either uses a maintenance flag or fails argument validation
//! first.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper: get a Command for the mapleads binary.
fn mapleads() -> assert_cmd::Command {
    cargo_bin_cmd!("mapleads")
}

/// Helper: copy the real config file into a temp dir so the binary can find
/// `./config/mapleads.toml` relative to its working directory.
fn setup_config_dir(tmp: &TempDir) {
    let src = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config");
    let dst = tmp.path().join("config");
    fs::create_dir_all(&dst).unwrap();
    fs::copy(src.join("mapleads.toml"), dst.join("mapleads.toml")).unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Missing config must not hang or abort the run
// ─────────────────────────────────────────────────────────────────────────────

/// When no config file exists and stdin is not a TTY (assert_cmd pipes
/// stdin), the binary must skip the interactive prompt, announce the
/// built-in defaults, and carry on to argument validation.
#[test]
fn test_missing_config_falls_back_to_builtin_defaults() {
    let tmp = TempDir::new().expect("create temp dir");

    // No query either, so the run stops at argument validation right after
    // the config fallback. Getting both messages proves the fallback
    // happened and nothing blocked on stdin.
    mapleads()
        .current_dir(tmp.path())
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("Proceeding with built-in defaults"))
        .stderr(predicate::str::contains("Search query is required"));
}

// ─────────────────────────────────────────────────────────────────────────────
// --init flag creates config file
// ─────────────────────────────────────────────────────────────────────────────

/// `--init` should create a default config file and exit successfully.
#[test]
fn test_init_creates_config_file() {
    let tmp = TempDir::new().expect("create temp dir");
    let config_path = tmp.path().join("config").join("mapleads.toml");

    assert!(!config_path.exists(), "config should not exist yet");

    mapleads()
        .current_dir(tmp.path())
        .arg("--init")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("Created default configuration file"));

    assert!(config_path.exists(), "config file should have been created");

    // Verify it's valid TOML with expected sections
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[search]"), "config should have [search] section");
    assert!(content.contains("[matching]"), "config should have [matching] section");
}

// ─────────────────────────────────────────────────────────────────────────────
// --help works regardless of config
// ─────────────────────────────────────────────────────────────────────────────

/// `--help` should work even without a config file (parsed before config load).
#[test]
fn test_help_works_without_config() {
    let tmp = TempDir::new().expect("create temp dir");

    mapleads()
        .current_dir(tmp.path())
        .arg("--help")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("mapleads"))
        .stdout(predicate::str::contains("--variation"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument validation runs before any browser work
// ─────────────────────────────────────────────────────────────────────────────

/// With a valid config but no query, the binary should get past config
/// loading and fail on argument validation.
#[test]
fn test_harvest_without_query_fails_validation() {
    let tmp = TempDir::new().expect("create temp dir");
    setup_config_dir(&tmp);

    mapleads()
        .current_dir(tmp.path())
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Search query is required"));
}

/// An unknown output format is rejected during validation.
#[test]
fn test_unknown_output_format_rejected() {
    let tmp = TempDir::new().expect("create temp dir");
    setup_config_dir(&tmp);

    mapleads()
        .current_dir(tmp.path())
        .args(["--query", "agence web casablanca", "--output-format", "xlsx"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Output format must be"));
}

// ─────────────────────────────────────────────────────────────────────────────
// --clear-cache works without a query
// ─────────────────────────────────────────────────────────────────────────────

/// `--clear-cache` is a maintenance command: no query, no browser, and a
/// missing cache directory simply clears zero entries.
#[test]
fn test_clear_cache_runs_without_query() {
    let tmp = TempDir::new().expect("create temp dir");
    setup_config_dir(&tmp);

    mapleads()
        .current_dir(tmp.path())
        .arg("--clear-cache")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 0 cached email lookups"));
}

/// `--clear-cache` removes previously written cache entries.
#[test]
fn test_clear_cache_removes_entries() {
    let tmp = TempDir::new().expect("create temp dir");
    setup_config_dir(&tmp);

    let cache_dir = tmp.path().join("cache");
    fs::create_dir_all(&cache_dir).unwrap();
    fs::write(cache_dir.join("webmarko.ma.json"), "{}").unwrap();
    fs::write(cache_dir.join("atlasweb.ma.json"), "{}").unwrap();

    mapleads()
        .current_dir(tmp.path())
        .arg("--clear-cache")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 cached email lookups"));

    assert!(!cache_dir.join("webmarko.ma.json").exists());
}

#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const POLICY: &str = "Do Not Track Compliance Policy\n\nVersion 1.0\n";

/// `dntcheck` with config and data directories inside `dir`.
fn dntcheck(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dntcheck").unwrap();
    cmd.env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .env_remove("DNTCHECK_POLICY")
        .env_remove("DNTCHECK_STORE")
        .env_remove("RUST_LOG");
    cmd
}

fn write_policy(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("dnt-policy.txt");
    std::fs::write(&path, POLICY).unwrap();
    path
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    dntcheck(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("config"));
}

// ---------------------------------------------------------------------------
// dntcheck check
// ---------------------------------------------------------------------------

#[test]
fn check_without_policy_file_fails() {
    let dir = TempDir::new().unwrap();
    dntcheck(&dir)
        .args(["check", "eff.org", "--policy"])
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not load policy text"));
}

#[test]
fn check_rejects_malformed_domain_without_fetching() {
    let dir = TempDir::new().unwrap();
    let policy = write_policy(&dir);

    dntcheck(&dir)
        .args(["-o", "json", "check", "not a domain", "--policy"])
        .arg(&policy)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"rejected\""))
        .stdout(predicate::str::contains("\"compliant\": null"));
}

#[test]
fn check_is_a_no_op_when_disabled() {
    let dir = TempDir::new().unwrap();
    let policy = write_policy(&dir);
    let store = dir.path().join("recheck.json");

    dntcheck(&dir)
        .args(["config", "set", "enabled", "false"])
        .assert()
        .success();

    dntcheck(&dir)
        .args(["-o", "json", "check", "eff.org", "--policy"])
        .arg(&policy)
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"disabled\""));

    // Nothing was stamped.
    dntcheck(&dir)
        .args(["-o", "json", "status", "--store"])
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("eff.org").not());
}

// ---------------------------------------------------------------------------
// dntcheck status
// ---------------------------------------------------------------------------

#[test]
fn status_reads_existing_store() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("recheck.json");
    std::fs::write(&store, r#"{"EFF.org": "2024-01-01T00:00:00Z"}"#).unwrap();

    dntcheck(&dir)
        .args(["-o", "json", "status", "--store"])
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"domain\": \"eff.org\""))
        .stdout(predicate::str::contains("\"eligible\": true"));
}

#[test]
fn status_on_empty_store() {
    let dir = TempDir::new().unwrap();
    dntcheck(&dir)
        .args(["status", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No domains have been checked yet"));
}

// ---------------------------------------------------------------------------
// dntcheck config
// ---------------------------------------------------------------------------

#[test]
fn config_set_then_show() {
    let dir = TempDir::new().unwrap();
    dntcheck(&dir)
        .args(["config", "set", "recheck_interval_secs", "600"])
        .assert()
        .success();

    dntcheck(&dir)
        .args(["-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"recheck_interval_secs\": 600"));
}

#[test]
fn config_set_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    dntcheck(&dir)
        .args(["config", "set", "api_key", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn config_path_is_under_config_home() {
    let dir = TempDir::new().unwrap();
    dntcheck(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

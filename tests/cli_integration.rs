//! Integration tests for the SaltVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Passwords are supplied through `SALTVAULT_PASSWORD` /
//! `SALTVAULT_NEW_PASSWORD` so no interactive prompt is reached, and a
//! `.saltvault.toml` lowers the PBKDF2 cost to keep runs quick.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "integration-pass";

/// Helper: get a Command pointing at the saltvault binary.
fn saltvault() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("saltvault").expect("binary should exist")
}

/// A project directory with a fast-KDF config file.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child(".saltvault.toml")
        .write_str("pbkdf2_iterations = 1000\n")
        .unwrap();
    tmp
}

/// A `saltvault` command running inside `dir` with the password set.
fn in_project(dir: &TempDir) -> Command {
    let mut cmd = saltvault();
    cmd.current_dir(dir.path())
        .env("SALTVAULT_PASSWORD", PASSWORD)
        .env_remove("SALTVAULT_NEW_PASSWORD");
    cmd
}

fn init(dir: &TempDir) {
    in_project(dir).arg("init").assert().success();
}

#[test]
fn help_flag_shows_usage() {
    saltvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pronounceable salts"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("rotate-key"))
        .stdout(predicate::str::contains("show-salt"));
}

#[test]
fn version_flag_shows_version() {
    saltvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("saltvault"));
}

#[test]
fn no_args_shows_help() {
    saltvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn salt_command_prints_hyphenated_words() {
    let tmp = project();
    let output = saltvault()
        .current_dir(tmp.path())
        .args(["salt", "--words", "5"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let line = String::from_utf8(output.stdout).unwrap();
    assert_eq!(line.trim().matches('-').count(), 4);
}

#[test]
fn salt_command_can_render_qr() {
    let tmp = project();
    saltvault()
        .current_dir(tmp.path())
        .args(["salt", "--words", "3", "--qr", "--level", "h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("█").or(predicate::str::contains("▀")));
}

#[test]
fn invalid_vault_name_rejected() {
    let tmp = project();
    in_project(&tmp)
        .args(["--vault", "UPPER", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

#[test]
fn get_on_missing_vault_fails() {
    let tmp = project();
    in_project(&tmp)
        .args(["get", "db_url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn init_creates_vault_file() {
    let tmp = project();
    in_project(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Salt:"));

    tmp.child(".saltvault/main.svault")
        .assert(predicate::path::exists());
}

#[test]
fn init_twice_fails() {
    let tmp = project();
    init(&tmp);
    in_project(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_rejects_short_password() {
    let tmp = project();
    saltvault()
        .current_dir(tmp.path())
        .env("SALTVAULT_PASSWORD", "short")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
}

#[test]
fn set_get_list_delete_flow() {
    let tmp = project();
    init(&tmp);

    in_project(&tmp)
        .args(["set", "db_url", "postgres://localhost/app"])
        .assert()
        .success();
    in_project(&tmp)
        .args(["set", "port", "5432", "--kind", "int"])
        .assert()
        .success();

    in_project(&tmp)
        .args(["get", "db_url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres://localhost/app"));

    in_project(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("port"))
        .stdout(predicate::str::contains("integer"));

    in_project(&tmp)
        .args(["delete", "port", "--force"])
        .assert()
        .success();
    in_project(&tmp)
        .args(["get", "port"])
        .assert()
        .failure();
}

#[test]
fn set_reads_piped_value() {
    let tmp = project();
    init(&tmp);

    in_project(&tmp)
        .args(["set", "token"])
        .write_stdin("piped-secret\n")
        .assert()
        .success();

    in_project(&tmp)
        .args(["get", "token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("piped-secret"));
}

#[test]
fn set_rejects_mistyped_value() {
    let tmp = project();
    init(&tmp);
    in_project(&tmp)
        .args(["set", "port", "not-a-number", "--kind", "int"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an integer"));
}

#[test]
fn verify_reports_wrong_password() {
    let tmp = project();
    init(&tmp);

    in_project(&tmp).arg("verify").assert().success();
    in_project(&tmp)
        .env("SALTVAULT_PASSWORD", "definitely-wrong")
        .arg("verify")
        .assert()
        .failure()
        .stderr(predicate::str::contains("password"));
}

#[test]
fn rotate_key_switches_password_and_salt() {
    let tmp = project();
    init(&tmp);
    in_project(&tmp)
        .args(["set", "api_key", "abc123"])
        .assert()
        .success();

    let before = saltvault()
        .current_dir(tmp.path())
        .arg("show-salt")
        .output()
        .unwrap();

    in_project(&tmp)
        .env("SALTVAULT_NEW_PASSWORD", "another-long-pass")
        .arg("rotate-key")
        .assert()
        .success();

    let after = saltvault()
        .current_dir(tmp.path())
        .arg("show-salt")
        .output()
        .unwrap();
    assert_ne!(before.stdout, after.stdout);

    in_project(&tmp).arg("verify").assert().failure();
    in_project(&tmp)
        .env("SALTVAULT_PASSWORD", "another-long-pass")
        .args(["get", "api_key"])
        .assert()
        .success()
        .stdout(predicate::str::contains("abc123"));
}

#[test]
fn named_vaults_are_separate_files() {
    let tmp = project();
    in_project(&tmp)
        .args(["--vault", "work", "init"])
        .assert()
        .success();

    tmp.child(".saltvault/work.svault")
        .assert(predicate::path::exists());
    tmp.child(".saltvault/main.svault")
        .assert(predicate::path::missing());
}

#[test]
fn completions_for_bash() {
    saltvault()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("saltvault"));
}

#[cfg(feature = "audit-log")]
#[test]
fn audit_lists_recorded_operations() {
    let tmp = project();
    init(&tmp);
    in_project(&tmp)
        .args(["set", "db_url", "x-value"])
        .assert()
        .success();

    in_project(&tmp)
        .args(["audit", "--last", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("db_url"));
}

#[cfg(feature = "audit-log")]
#[test]
fn audit_records_rotation_key_parameters() {
    let tmp = project();
    init(&tmp);
    in_project(&tmp)
        .env("SALTVAULT_NEW_PASSWORD", "another-long-pass")
        .arg("rotate-key")
        .assert()
        .success();

    in_project(&tmp)
        .args(["audit", "--op", "rotate-key"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rotate-key"))
        .stdout(predicate::str::contains("iterations 1000 -> 1000"))
        .stdout(predicate::str::contains("1 audit records"));
}

#[cfg(feature = "audit-log")]
#[test]
fn audit_is_scoped_to_the_selected_vault() {
    let tmp = project();
    init(&tmp);
    in_project(&tmp)
        .args(["--vault", "work", "init"])
        .assert()
        .success();

    in_project(&tmp)
        .args(["audit", "--op", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 audit records"));

    in_project(&tmp)
        .args(["audit", "--op", "init", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 audit records"))
        .stdout(predicate::str::contains("work"));
}

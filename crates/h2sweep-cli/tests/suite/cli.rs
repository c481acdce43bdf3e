use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn h2sweep() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("h2sweep"))
}

fn project_with_data(files: &[&str]) -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    temp.child("data").create_dir_all().unwrap();
    for file in files {
        temp.child(format!("data/{file}"))
            .write_binary(&[0u8; 512])
            .unwrap();
    }
    temp
}

#[test]
fn sweep_deletes_matching_files_and_confirms() {
    let temp = project_with_data(&["a.mv.db", "b.trace.db", "c.txt"]);

    h2sweep()
        .args(["sweep", "--path"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted: "))
        .stdout(predicate::str::contains("cleaned up H2 database files"));

    temp.child("data/a.mv.db").assert(predicate::path::missing());
    temp.child("data/b.trace.db")
        .assert(predicate::path::missing());
    temp.child("data/c.txt").assert(predicate::path::exists());
}

#[test]
fn sweep_confirms_even_when_nothing_matches() {
    let temp = project_with_data(&[]);

    h2sweep()
        .args(["sweep", "--path"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("cleaned up H2 database files"));
}

#[test]
fn sweep_tolerates_a_missing_data_directory() {
    let temp = TempDir::new().expect("tempdir");

    h2sweep()
        .args(["sweep", "--path"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("cleaned up H2 database files"));
}

#[test]
fn sweep_json_reports_deleted_files() {
    let temp = project_with_data(&["buyrecipes.mv.db"]);

    let assert = h2sweep()
        .args(["sweep", "--json", "--path"])
        .arg(temp.path())
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("JSON report");
    assert_eq!(report["deleted"][0]["name"], "buyrecipes.mv.db");
    assert_eq!(report["failed"], serde_json::json!([]));
}

#[test]
fn sweep_honors_the_data_dir_flag() {
    let temp = TempDir::new().expect("tempdir");
    temp.child("elsewhere/h2.mv.db")
        .write_binary(&[0u8; 16])
        .unwrap();

    h2sweep()
        .args(["sweep", "--path"])
        .arg(temp.path())
        .args(["--data-dir", "elsewhere"])
        .assert()
        .success();

    temp.child("elsewhere/h2.mv.db")
        .assert(predicate::path::missing());
}

#[test]
fn sweep_honors_the_data_dir_env_override() {
    let temp = TempDir::new().expect("tempdir");
    let other = temp.child("env-dir");
    other.create_dir_all().unwrap();
    other.child("h2.trace.db").write_binary(&[0u8; 16]).unwrap();

    h2sweep()
        .args(["sweep", "--path"])
        .arg(temp.path())
        .env("H2SWEEP_DATA_DIR", other.path())
        .assert()
        .success();

    other.child("h2.trace.db").assert(predicate::path::missing());
}

#[test]
fn list_is_read_only() {
    let temp = project_with_data(&["buyrecipes.mv.db", "c.txt"]);

    h2sweep()
        .args(["list", "--path"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("buyrecipes.mv.db"))
        .stdout(predicate::str::contains("found 1 database artifact(s)"));

    temp.child("data/buyrecipes.mv.db")
        .assert(predicate::path::exists());
}

#[cfg(unix)]
fn write_fake_gradlew(temp: &TempDir, exit_code: i32) {
    use std::os::unix::fs::PermissionsExt;

    let gradlew = temp.child("gradlew");
    gradlew
        .write_str(&format!("#!/bin/sh\nexit {exit_code}\n"))
        .unwrap();
    let mut perms = std::fs::metadata(gradlew.path()).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(gradlew.path(), perms).unwrap();

    temp.child("build.gradle.kts").write_str("plugins {}\n").unwrap();
}

#[cfg(unix)]
#[test]
fn test_subcommand_sweeps_after_failing_tests() {
    let temp = project_with_data(&["buyrecipes.mv.db"]);
    write_fake_gradlew(&temp, 7);

    h2sweep()
        .args(["test", "--path"])
        .arg(temp.path())
        .assert()
        .code(7)
        .stdout(predicate::str::contains("tests: failed (exit code 7)"))
        .stdout(predicate::str::contains("cleaned up H2 database files"));

    temp.child("data/buyrecipes.mv.db")
        .assert(predicate::path::missing());
}

#[cfg(unix)]
#[test]
fn test_subcommand_passes_through_success() {
    let temp = project_with_data(&["buyrecipes.trace.db"]);
    write_fake_gradlew(&temp, 0);

    h2sweep()
        .args(["test", "--path"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("tests: passed (exit code 0)"));

    temp.child("data/buyrecipes.trace.db")
        .assert(predicate::path::missing());
}

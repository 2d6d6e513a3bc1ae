//! Command-line surface: help, dry runs and `set-version`.

use crate::common::TestProject;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let project = TestProject::new().unwrap();
    project
        .pinpack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("set-version"));
}

#[test]
fn test_dry_run_prints_project_command() {
    let project = TestProject::with_requires(&["puka"]).unwrap();
    project.pin(&[("puka", "0.0.7")]).unwrap();

    project
        .pinpack()
        .args(["build", "--package-version", "1.2.0", "--dry-run", "--", "--iteration", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--version=1.2.0.1"))
        .stdout(predicate::str::contains("-d 'python-puka >= 0.0.7'"));
}

#[test]
fn test_set_version_succeeds() {
    let project = TestProject::new().unwrap();
    project
        .pinpack()
        .args(["set-version", "2.0.0", "--annotated", "--changelog", "Release notes"])
        .assert()
        .success();
}

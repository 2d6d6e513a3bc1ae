//! Fatal errors: nothing is packaged and the exit status is 1.

use crate::common::TestProject;
use predicates::prelude::*;
use std::path::Path;

#[test]
fn test_missing_versions_file_is_fatal() {
    let project = TestProject::with_requires(&["puka"]).unwrap();

    project
        .build("1.0", &["--versions-file", "missing.cfg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Versions file not found"));

    assert!(project.fpm_calls().is_empty());
}

#[test]
fn test_malformed_versions_file_is_fatal() {
    let project = TestProject::with_requires(&["puka"]).unwrap();
    project.write("versions.cfg", "puka = 0.0.7\n").unwrap();

    project.build("1.0", &[]).assert().code(1).stderr(predicate::str::contains("versions.cfg"));
    assert!(project.fpm_calls().is_empty());
}

#[test]
fn test_missing_tool_is_fatal() {
    let project = TestProject::with_requires(&["puka"]).unwrap();
    project
        .write_config(Path::new("/nonexistent/fpm"), Path::new("/nonexistent/dpkg"))
        .unwrap();

    project
        .build("1.0", &[])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Required tool '/nonexistent/fpm' was not found"));
}

#[test]
fn test_invalid_include_pattern_is_fatal() {
    let project = TestProject::with_requires(&["puka"]).unwrap();

    project
        .build("1.0", &["-i", "(unclosed"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid argument"));
    assert!(project.fpm_calls().is_empty());
}

#[test]
fn test_conflicting_pin_strategies_are_rejected() {
    let project = TestProject::with_requires(&[]).unwrap();

    project.build("1.0", &["--pin-exact", "--pin-greater-or-equal"]).assert().code(1);
}

#[test]
fn test_invalid_config_is_fatal() {
    let project = TestProject::with_requires(&[]).unwrap();
    project.write("pinpack.toml", "[packaging]\nmaintainr = \"typo\"\n").unwrap();

    project
        .build("1.0", &[])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

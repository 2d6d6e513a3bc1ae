//! `--include` filtering of direct dependencies.

use crate::common::TestProject;
use predicates::prelude::*;

#[test]
fn test_include_restricts_recursive_builds() {
    let project = TestProject::with_requires(&["puka", "requests", "vdt.version"]).unwrap();

    project
        .build("1.0", &["-i", "^pu", "--include", "^vdt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 skipped"));

    assert_eq!(project.calls_for("puka").len(), 1);
    assert_eq!(project.calls_for("vdt.version").len(), 1);
    assert!(project.calls_for("requests").is_empty());

    // The project still declares everything it depends on
    assert!(project.project_call().unwrap().contains("-d python-requests"));
}

#[test]
fn test_excluded_dependency_is_not_built_through_included_packages() {
    let project = TestProject::with_requires(&["puka", "requests"]).unwrap();
    project.depends("puka", "python, python-requests, python-six").unwrap();

    project.build("1.0", &["-i", "puka"]).assert().success();

    assert_eq!(project.calls_for("puka").len(), 1);
    assert!(project.calls_for("requests").is_empty());
    // Dependencies that were never filtered out are still followed
    assert_eq!(project.calls_for("six").len(), 1);
    assert!(project.project_call().unwrap().contains("-d python-requests"));
}

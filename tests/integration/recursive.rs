//! Recursive dependency building.

use crate::common::TestProject;
use predicates::prelude::*;

#[test]
fn test_cycle_builds_each_package_once() {
    let project = TestProject::with_requires(&["a"]).unwrap();
    project.pin(&[("a", "1.0"), ("b", "2.0")]).unwrap();
    project.depends("a", "python, python-b (>= 2.0)").unwrap();
    project.depends("b", "python, python-a (>= 1.0)").unwrap();

    project
        .build("1.2.0", &[])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 dependencies built"));

    let a = project.calls_for("a");
    let b = project.calls_for("b");
    assert_eq!(a.len(), 1, "{:?}", project.fpm_calls());
    assert_eq!(b.len(), 1, "{:?}", project.fpm_calls());
    assert!(a[0].contains("--version=1.0"));
    assert!(b[0].contains("--version=2.0"));
    assert!(project.project_call().is_some());
}

#[test]
fn test_transitive_dependencies_are_built_with_pins() {
    let project = TestProject::with_requires(&["mock"]).unwrap();
    project.pin(&[("mock", "1.0.1"), ("six", "1.9.0")]).unwrap();
    project.depends("mock", "python, python-six, python-pbr").unwrap();

    project.build("1.0", &[]).assert().success();

    let six = project.calls_for("six");
    let pbr = project.calls_for("pbr");
    assert_eq!(six.len(), 1);
    assert!(six[0].contains("--version=1.9.0"));
    // Unpinned dependencies are built at whatever version the index offers
    assert_eq!(pbr.len(), 1);
    assert!(!pbr[0].contains("--version="));
}

#[test]
fn test_dependency_builds_keep_fpm_dependency_inference() {
    let project = TestProject::with_requires(&["puka"]).unwrap();
    project.pin(&[("puka", "0.0.7")]).unwrap();

    project.build("1.0", &["--iteration", "4"]).assert().success();

    let puka = &project.calls_for("puka")[0];
    assert!(!puka.contains("--no-python-dependencies"));
    assert!(puka.contains("--version=0.0.7 "));
}

#[test]
fn test_failed_dependency_does_not_stop_the_run() {
    let project = TestProject::with_requires(&["broken", "good"]).unwrap();
    project.fail("broken").unwrap();

    project
        .build("1.0", &[])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 failed"))
        .stdout(predicate::str::contains("broken"));

    assert_eq!(project.calls_for("good").len(), 1);
    assert!(project.project_call().is_some());
    assert!(project.exists("python-project.deb"));
}

#[test]
fn test_strict_mode_reports_dependency_failures() {
    let project = TestProject::with_requires(&["broken"]).unwrap();
    project.fail("broken").unwrap();

    project
        .pinpack()
        .args(["build", "--package-version", "1.0", "--strict"])
        .assert()
        .code(2);
    assert!(project.project_call().is_some());
}

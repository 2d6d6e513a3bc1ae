//! Packaging the project itself.

use crate::common::TestProject;

#[test]
fn test_project_declares_pinned_dependencies() {
    let project = TestProject::with_requires(&["puka", "six>=1.0"]).unwrap();
    project.pin(&[("puka", "0.0.7")]).unwrap();

    project.build("1.2.0", &[]).assert().success();

    let call = project.project_call().unwrap();
    assert!(call.contains("--version=1.2.0 "));
    assert!(call.contains("--no-python-dependencies"));
    assert!(call.contains("-d python-puka >= 0.0.7"));
    assert!(call.contains("-d python-six"));
    assert!(call.contains("--maintainer=Release Team"));
}

#[test]
fn test_pin_exact_strategy() {
    let project = TestProject::with_requires(&["puka"]).unwrap();
    project.pin(&[("puka", "0.0.7")]).unwrap();

    project.build("1.2.0", &["--pin-exact"]).assert().success();

    assert!(project.project_call().unwrap().contains("-d python-puka = 0.0.7"));
}

#[test]
fn test_iteration_only_applies_to_the_project() {
    let project = TestProject::with_requires(&["puka"]).unwrap();
    project.pin(&[("puka", "0.0.7")]).unwrap();

    project.build("1.2.0", &["--iteration", "2"]).assert().success();

    assert!(project.project_call().unwrap().contains("--version=1.2.0.2"));
    assert!(!project.calls_for("puka")[0].contains("0.0.7.2"));
}

#[test]
fn test_unrecognized_arguments_reach_fpm() {
    let project = TestProject::with_requires(&["puka"]).unwrap();

    project.build("1.0", &["--deb-user", "root", "-i", "puka"]).assert().success();

    let call = project.project_call().unwrap();
    let user = call.find("--deb-user root").unwrap();
    let depends = call.find("-d python-puka").unwrap();
    assert!(user < depends);
    assert!(!call.contains("-i puka"));
}

#[test]
fn test_project_packaging_failure_is_fatal() {
    let project = TestProject::with_requires(&[]).unwrap();
    project.fail("project").unwrap();

    project
        .build("1.0", &[])
        .assert()
        .code(1)
        .stderr(predicates::str::contains("fpm failed with exit code 1"))
        .stderr(predicates::str::contains("Failed to fetch project"));
}

#[test]
fn test_project_without_dependencies() {
    let project = TestProject::with_requires(&[]).unwrap();

    project.build("1.0", &[]).assert().success();

    assert_eq!(project.fpm_calls().len(), 1);
    assert!(!project.project_call().unwrap().contains(" -d "));
}

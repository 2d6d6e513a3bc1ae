//! Stale artifact removal before a build.

use crate::common::TestProject;

#[test]
fn test_stale_artifacts_are_removed_before_building() {
    let project = TestProject::with_requires(&[]).unwrap();
    project.write("python-old_0.1_all.deb", "stale").unwrap();
    project.write("notes.txt", "keep").unwrap();
    project.write("python-old-0.1.rpm", "other target").unwrap();

    project.build("1.0", &[]).assert().success();

    assert!(!project.exists("python-old_0.1_all.deb"));
    assert!(project.exists("notes.txt"));
    assert!(project.exists("python-old-0.1.rpm"));
    assert!(project.exists("python-project.deb"));
}

#[test]
fn test_dry_run_leaves_artifacts_alone() {
    let project = TestProject::with_requires(&[]).unwrap();
    project.write("python-old_0.1_all.deb", "stale").unwrap();

    project
        .pinpack()
        .args(["build", "--package-version", "1.0", "--dry-run"])
        .assert()
        .success();

    assert!(project.exists("python-old_0.1_all.deb"));
    assert!(project.fpm_calls().is_empty());
}

//! Outcome of a build run.

use std::fmt;

use crate::naming::PackageName;
use crate::packaging::BuiltArtifact;

/// Exit status of a completed run.
pub const EXIT_OK: i32 = 0;
/// Exit status with `--strict` when at least one dependency failed.
pub const EXIT_DEPENDENCY_FAILED: i32 = 2;

/// A dependency that could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPackage {
    pub name: PackageName,
    pub version: Option<String>,
    pub reason: String,
}

/// Two pins for the same package met in one level; the first one was kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinConflict {
    pub name: PackageName,
    pub kept: Option<String>,
    pub rejected: Option<String>,
    /// Package whose dependencies carried the rejected pin
    pub requested_by: PackageName,
}

impl fmt::Display for PinConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "unpinned".to_string());
        write!(
            f,
            "{}: kept {}, ignored {} requested by {}",
            self.name,
            show(&self.kept),
            show(&self.rejected),
            self.requested_by
        )
    }
}

/// Everything a run did, for the summary and the exit status.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Dependencies packaged, in build order
    pub built: Vec<BuiltArtifact>,
    pub failed: Vec<FailedPackage>,
    /// Direct dependencies left out by `--include`
    pub skipped: Vec<PackageName>,
    pub conflicts: Vec<PinConflict>,
    /// The project's own artifact; `None` for dry runs
    pub project: Option<BuiltArtifact>,
    /// The project's packaging command line
    pub project_command: Vec<String>,
}

impl BuildReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Whether `name` was packaged in this run.
    pub fn was_built(&self, name: &str) -> bool {
        let name = PackageName::new(name);
        self.built.iter().any(|artifact| artifact.name == name)
    }

    /// Process exit status for this report.
    ///
    /// Dependency failures only change the status when `strict` is set.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && self.has_failures() { EXIT_DEPENDENCY_FAILED } else { EXIT_OK }
    }

    /// One-line summary for the end of a run.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} dependencies built", self.built.len())];
        if !self.failed.is_empty() {
            parts.push(format!("{} failed", self.failed.len()));
        }
        if !self.skipped.is_empty() {
            parts.push(format!("{} skipped", self.skipped.len()));
        }
        if !self.conflicts.is_empty() {
            parts.push(format!("{} pin conflicts", self.conflicts.len()));
        }
        parts.join(", ")
    }
}

//! The recursive dependency builder.
//!
//! Dependencies are built level by level from a worklist: every package of the
//! current level is built, the dependencies its artifact declares are pinned
//! against the shared versions table, and whatever has not been seen yet forms the
//! next level. Every package is handed to the packaging tool at most once per run,
//! so cyclic and diamond-shaped graphs terminate.
//!
//! Failures are per package: a dependency that cannot be fetched or packaged is
//! recorded in the report and its siblings carry on.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::report::{BuildReport, FailedPackage, PinConflict};
use crate::naming::{NameSchemeTable, PackageName};
use crate::packaging::PackageBuilder;
use crate::pinning::{Insertion, PinnedDependencySet, pin};
use crate::utils::ProgressBar;
use crate::versions::VersionsTable;

/// Where a package stands in the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    /// Being fetched and packaged
    InProgress,
    /// Packaged; its dependencies have been queued
    Built,
    /// Fetching or packaging failed
    Failed,
    /// Never handed to the packaging tool (e.g. the project itself)
    Reserved,
    /// Filtered out by `--include`; not built at any depth
    Excluded,
}

/// Builds the transitive closure of a pinned dependency set.
pub struct RecursiveBuilder<'a> {
    builder: &'a dyn PackageBuilder,
    table: &'a VersionsTable,
    scheme: &'a NameSchemeTable,
    progress: ProgressBar,
    states: HashMap<PackageName, PackageState>,
}

impl<'a> RecursiveBuilder<'a> {
    pub fn new(
        builder: &'a dyn PackageBuilder,
        table: &'a VersionsTable,
        scheme: &'a NameSchemeTable,
    ) -> Self {
        Self {
            builder,
            table,
            scheme,
            progress: ProgressBar::hidden(),
            states: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Never build `name`, even if something depends on it.
    pub fn reserve(&mut self, name: PackageName) {
        self.states.insert(name, PackageState::Reserved);
    }

    /// Keep `name` out of the run entirely, including when it turns up as a
    /// transitive dependency.
    pub fn exclude(&mut self, name: PackageName) {
        self.states.insert(name, PackageState::Excluded);
    }

    /// State of `name` in this run, `None` if it was never reached.
    pub fn state(&self, name: &str) -> Option<PackageState> {
        self.states.get(PackageName::new(name).as_str()).copied()
    }

    /// Build every package in `initial` and, transitively, everything they depend on.
    pub async fn build_all(&mut self, initial: PinnedDependencySet, report: &mut BuildReport) {
        let mut level = initial;
        let mut depth = 0usize;

        while !level.is_empty() {
            debug!("Building dependency level {} ({} packages)", depth, level.len());
            let mut next = PinnedDependencySet::new();

            for (name, version) in level.iter() {
                if self.states.contains_key(name) {
                    continue;
                }
                let fragment = self.build_one(name, version, report).await;

                for (dependency, pinned) in fragment.iter() {
                    if self.states.contains_key(dependency) {
                        continue;
                    }
                    let pinned = pinned.map(str::to_string);
                    if let Insertion::Conflict { kept, rejected } = next.insert(dependency.clone(), pinned)
                    {
                        let conflict = PinConflict {
                            name: dependency.clone(),
                            kept,
                            rejected,
                            requested_by: name.clone(),
                        };
                        warn!("Conflicting pins for {}", conflict);
                        report.conflicts.push(conflict);
                    }
                }
            }

            level = next;
            depth += 1;
        }
    }

    /// Build one package and return its pinned dependencies.
    async fn build_one(
        &mut self,
        name: &PackageName,
        version: Option<&str>,
        report: &mut BuildReport,
    ) -> PinnedDependencySet {
        self.states.insert(name.clone(), PackageState::InProgress);
        self.progress.set_message(match version {
            Some(version) => format!("Building {name} {version}"),
            None => format!("Building {name}"),
        });

        let artifact = match self.builder.build_dependency(name, version).await {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!("Failed to build {}: {:#}", name, e);
                self.states.insert(name.clone(), PackageState::Failed);
                report.failed.push(FailedPackage {
                    name: name.clone(),
                    version: version.map(str::to_string),
                    reason: format!("{e:#}"),
                });
                return PinnedDependencySet::new();
            }
        };

        let dependencies = match self.builder.artifact_dependencies(&artifact).await {
            Ok(dependencies) => dependencies,
            Err(e) => {
                warn!("Could not read dependencies of {}: {:#}", artifact.path.display(), e);
                Vec::new()
            }
        };

        self.states.insert(name.clone(), PackageState::Built);
        info!("{} built ({} dependencies)", name, dependencies.len());
        report.built.push(artifact);

        pin(&dependencies, self.table, self.scheme)
    }
}

//! Build orchestration.
//!
//! [`build_package`] runs one complete build of a project:
//!
//! 1. Load `pinpack.toml`, the versions table and the include filter
//! 2. Check the packaging tools and remove stale artifacts from the project directory
//! 3. Read the project's direct dependencies and pin them
//! 4. Build every included dependency, recursively ([`RecursiveBuilder`])
//! 5. Package the project itself with explicit dependency declarations
//!
//! Only configuration problems, cleanup failures and a failure to package the
//! project itself abort the run. Dependency failures end up in the [`BuildReport`].

pub mod args;
pub mod recursive;
pub mod report;

pub use args::BuildArgs;
pub use recursive::{PackageState, RecursiveBuilder};
pub use report::{BuildReport, EXIT_DEPENDENCY_FAILED, EXIT_OK, FailedPackage, PinConflict};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use crate::cleaner;
use crate::config::PinpackConfig;
use crate::core::PinpackError;
use crate::descriptor::DescriptorReader;
use crate::naming::{NameSchemeTable, PackageName};
use crate::packaging::{BuildContext, ProjectBuild, create_builder};
use crate::pinning::{IncludeFilter, pin};
use crate::tools;
use crate::utils::ProgressBar;
use crate::versions::VersionsTable;

/// Uninstall hook used when `pinpack.toml` does not name one.
const PREREMOVE_SCRIPT: &str = include_str!("../../files/preremove");
const PREREMOVE_FILE_NAME: &str = "preremove";

/// One build run.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Directory holding the project's descriptor; artifacts are written here
    pub project_dir: PathBuf,
    /// Release version of the project
    pub version: String,
    pub args: BuildArgs,
    /// Explicit `pinpack.toml`
    pub config_path: Option<PathBuf>,
    /// Only compute the project's packaging command
    pub dry_run: bool,
    pub show_progress: bool,
}

impl BuildRequest {
    pub fn new(project_dir: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            project_dir: project_dir.into(),
            version: version.into(),
            args: BuildArgs::default(),
            config_path: None,
            dry_run: false,
            show_progress: false,
        }
    }
}

/// Build the project in `request.project_dir` and everything it depends on.
///
/// # Errors
///
/// Fails before anything is packaged when the configuration, the versions file or
/// a build option is invalid, a required tool is missing, or stale artifacts
/// cannot be removed. Fails after the dependencies were built when the project
/// itself cannot be packaged.
pub async fn build_package(request: &BuildRequest) -> Result<BuildReport> {
    let project_dir = std::fs::canonicalize(&request.project_dir).with_context(|| {
        format!("Project directory {} does not exist", request.project_dir.display())
    })?;
    let args = &request.args;

    let config = PinpackConfig::load(request.config_path.as_deref(), &project_dir)?;
    let table = VersionsTable::load_for_project(args.versions_file.as_deref(), &project_dir)?;
    let filter = IncludeFilter::new(&args.include)?;
    let scheme = NameSchemeTable::default()
        .with_namespace_prefix(config.packaging.namespace_prefix.clone());

    // Removed on drop, so every early return below cleans up too
    let staging = tempfile::Builder::new()
        .prefix("pinpack-")
        .tempdir()
        .context("Failed to create staging directory")?;
    let before_remove = prepare_before_remove(&config, &project_dir, staging.path())?;
    debug!("Uninstall hook: {}", before_remove.display());

    let builder = create_builder(
        args.target,
        &config,
        BuildContext {
            working_dir: project_dir.clone(),
            before_remove,
            scheme: scheme.clone(),
        },
    );

    if !request.dry_run {
        for tool in builder.required_tools() {
            tools::locate(&tool).with_context(|| format!("Preparing {} builder", args.target))?;
        }
        let removed = cleaner::clean(&project_dir, args.target.extension())?;
        if !removed.is_empty() {
            info!("Removed {} stale artifacts: {}", removed.len(), removed.join(", "));
        }
    }

    let reader = DescriptorReader::new(tools::locate(&config.tools.python).ok());
    let direct = reader.read_dependencies(&project_dir).await;
    info!("{} direct dependencies", direct.len());

    let pinned = pin(&direct, &table, &scheme);
    // The project declares every direct dependency, included or not
    let dependency_flags = pinned.dependency_flags(&scheme, args.pin_strategy);
    let (to_build, skipped) = pinned.partition(|name| filter.matches(name));
    if !skipped.is_empty() {
        debug!("Not building {} dependencies excluded by --include", skipped.len());
    }

    let project = ProjectBuild {
        name: project_name(&project_dir)?,
        descriptor: project_descriptor(&project_dir),
        version: request.version.clone(),
        iteration: args.iteration.clone(),
        dependency_flags,
        extra_args: args.extra_args.clone(),
    };

    let mut report = BuildReport {
        skipped,
        project_command: builder.project_command(&project),
        ..Default::default()
    };

    if request.dry_run {
        return Ok(report);
    }

    let progress = ProgressBar::for_flag(request.show_progress);
    let mut engine = RecursiveBuilder::new(builder.as_ref(), &table, &scheme)
        .with_progress(progress.clone());
    engine.reserve(project.name.clone());
    for name in &report.skipped {
        engine.exclude(name.clone());
    }
    engine.build_all(to_build, &mut report).await;

    progress.set_message(format!("Building {}", project.name));
    let artifact = builder
        .build_project(&project)
        .await
        .with_context(|| format!("Failed to package {}", project.name));
    progress.finish_and_clear();
    report.project = Some(artifact?);

    if let Err(e) = staging.close() {
        warn!("Failed to remove staging directory: {}", e);
    }
    Ok(report)
}

/// Uninstall hook for this run: the configured script, or the bundled one
/// written into `staging`.
fn prepare_before_remove(
    config: &PinpackConfig,
    project_dir: &Path,
    staging: &Path,
) -> Result<PathBuf> {
    if let Some(path) = &config.packaging.before_remove {
        let path = if path.is_relative() {
            project_dir.join(path)
        } else {
            path.clone()
        };
        if !path.is_file() {
            return Err(PinpackError::ConfigError {
                message: format!("before_remove script {} does not exist", path.display()),
            }
            .into());
        }
        return Ok(path);
    }

    let path = staging.join(PREREMOVE_FILE_NAME);
    std::fs::write(&path, PREREMOVE_SCRIPT)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn project_name(project_dir: &Path) -> Result<PackageName> {
    project_dir
        .file_name()
        .map(|name| PackageName::new(name.to_string_lossy()))
        .ok_or_else(|| anyhow!("Cannot derive a project name from {}", project_dir.display()))
}

/// `setup.py` when the project has one, else the directory itself.
fn project_descriptor(project_dir: &Path) -> PathBuf {
    let setup_py = project_dir.join("setup.py");
    if setup_py.is_file() { setup_py } else { project_dir.to_path_buf() }
}

/// A release version handed over by the release tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseVersion {
    pub version: String,
    /// Whether the version comes from an annotated tag
    pub annotated: bool,
    /// Release notes attached to an annotated tag
    pub changelog: Option<String>,
}

/// Prepare the project's sources for a release.
///
/// Descriptors are not rewritten; the version reaches the package through the
/// packaging tool's version flag instead.
pub fn set_package_version(release: &ReleaseVersion) -> Result<()> {
    debug!("set_package_version is not implemented for pinpack (version {})", release.version);
    let has_changelog = release.changelog.as_deref().is_some_and(|c| !c.is_empty());
    if release.annotated && has_changelog {
        debug!("Got an annotated version, should modify setup.py");
    }
    Ok(())
}

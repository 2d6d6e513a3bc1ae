//! Package builders for the supported output formats.
//!
//! A [`PackageBuilder`] knows how to turn a dependency (by name and pinned version)
//! or the project itself into one artifact, and how to read the dependencies back
//! out of an artifact it produced. The recursive build engine only talks to this
//! trait, so the output format is a runtime choice (`--target`):
//!
//! | Target  | Builder            | Tooling                           |
//! |---------|--------------------|-----------------------------------|
//! | `deb`   | [`DebianBuilder`]  | `fpm -t deb`, `dpkg -f`           |
//! | `rpm`   | [`RpmBuilder`]     | `fpm -t rpm`, `rpm -qp --requires` |
//! | `wheel` | [`WheelBuilder`]   | `pip wheel`, wheel `METADATA`     |

pub mod command;
pub mod fpm;
pub mod inspect;
pub mod wheel;

pub use command::{
    InvocationOptions, PackagingInvocation, PackagingProfile, build_command, emitted_version,
};
pub use fpm::{DebianBuilder, RpmBuilder};
pub use wheel::WheelBuilder;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use crate::config::PinpackConfig;
use crate::naming::{NameSchemeTable, PackageName};

/// Output package format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum PackageTarget {
    /// Debian package
    #[default]
    Deb,
    /// RPM package
    Rpm,
    /// Python wheel
    Wheel,
}

impl PackageTarget {
    /// File extension of produced artifacts, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Deb => "deb",
            Self::Rpm => "rpm",
            Self::Wheel => "whl",
        }
    }
}

impl fmt::Display for PackageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deb => "deb",
            Self::Rpm => "rpm",
            Self::Wheel => "wheel",
        })
    }
}

/// A produced package file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    pub name: PackageName,
    /// Version the package was built at, `None` when unpinned
    pub version: Option<String>,
    pub path: PathBuf,
}

/// Everything needed to package the project itself.
#[derive(Debug, Clone)]
pub struct ProjectBuild {
    /// Project name, used for logging and name overrides
    pub name: PackageName,
    /// Descriptor path handed to the tool as the positional argument
    pub descriptor: PathBuf,
    /// Release version of the project
    pub version: String,
    /// Hotfix iteration
    pub iteration: Option<String>,
    /// Explicit `-d` dependency declarations
    pub dependency_flags: Vec<String>,
    /// Unrecognized options, passed through verbatim
    pub extra_args: Vec<String>,
}

/// Per-run environment shared by the builders.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Directory artifacts are written to (also the one the cleaner empties)
    pub working_dir: PathBuf,
    /// Uninstall hook script, usually inside the run's staging directory
    pub before_remove: PathBuf,
    pub scheme: NameSchemeTable,
}

/// One output format.
#[async_trait]
pub trait PackageBuilder: Send + Sync {
    fn target(&self) -> PackageTarget;

    /// Executables this builder runs, as configured.
    fn required_tools(&self) -> Vec<String>;

    /// Fetch and package a dependency.
    async fn build_dependency(
        &self,
        name: &PackageName,
        version: Option<&str>,
    ) -> Result<BuiltArtifact>;

    /// Declared dependencies of an artifact this builder produced.
    async fn artifact_dependencies(&self, artifact: &BuiltArtifact) -> Result<Vec<PackageName>>;

    /// Command line used to package the project.
    fn project_command(&self, project: &ProjectBuild) -> Vec<String>;

    /// Package the project itself.
    async fn build_project(&self, project: &ProjectBuild) -> Result<BuiltArtifact>;
}

/// Builder for `target`, configured from `config`.
pub fn create_builder(
    target: PackageTarget,
    config: &PinpackConfig,
    context: BuildContext,
) -> Box<dyn PackageBuilder> {
    match target {
        PackageTarget::Deb => Box::new(DebianBuilder::new(config, context)),
        PackageTarget::Rpm => Box::new(RpmBuilder::new(config, context)),
        PackageTarget::Wheel => Box::new(WheelBuilder::new(config, context)),
    }
}

/// Resolve a tool-reported artifact path against the directory the tool ran in.
pub(crate) fn resolve_artifact_path(working_dir: &Path, reported: &str) -> PathBuf {
    let path = Path::new(reported);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

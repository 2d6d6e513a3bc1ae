//! Wheel archives via `pip wheel`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use super::inspect::{parse_pip_output, parse_wheel_metadata, read_wheel_metadata};
use super::{
    BuildContext, BuiltArtifact, PackageBuilder, PackageTarget, ProjectBuild,
    resolve_artifact_path,
};
use crate::config::PinpackConfig;
use crate::core::PinpackError;
use crate::naming::PackageName;
use crate::tools::ToolCommand;

/// Builds wheels with `pip wheel --no-deps`, one package at a time.
///
/// Wheels carry their own `Requires-Dist` metadata, so explicit dependency
/// declarations do not apply to the project build and the version comes from the
/// project's descriptor.
#[derive(Debug, Clone)]
pub struct WheelBuilder {
    pip: String,
    working_dir: PathBuf,
}

impl WheelBuilder {
    pub fn new(config: &PinpackConfig, context: BuildContext) -> Self {
        Self {
            pip: config.tools.pip.clone(),
            working_dir: context.working_dir,
        }
    }

    fn wheel_command(&self, extra_args: &[String], source: &str) -> Vec<String> {
        let mut tokens = vec![
            self.pip.clone(),
            "wheel".to_string(),
            "--no-deps".to_string(),
            "-w".to_string(),
            self.working_dir.display().to_string(),
        ];
        tokens.extend(extra_args.iter().cloned());
        tokens.push(source.to_string());
        tokens
    }

    async fn run(
        &self,
        tokens: &[String],
        name: &PackageName,
        version: Option<&str>,
    ) -> Result<BuiltArtifact> {
        let output = ToolCommand::new(&tokens[0])
            .args(tokens[1..].iter().cloned())
            .current_dir(&self.working_dir)
            .with_context(name.as_str())
            .execute()
            .await?;

        let path = match parse_pip_output(&output.stdout) {
            Some(reported) => resolve_artifact_path(&self.working_dir, &reported),
            None => find_wheel(&self.working_dir, name)?,
        };

        info!("Built {} -> {}", name, path.display());
        Ok(BuiltArtifact {
            name: name.clone(),
            version: version.map(str::to_string),
            path,
        })
    }
}

/// Wheel for `name` in `dir`, when pip did not say where it saved it.
///
/// Wheel file names use `_` for `-` and may keep the project's original case.
fn find_wheel(dir: &Path, name: &PackageName) -> Result<PathBuf, PinpackError> {
    let stem = name.as_str().replace(['-', '.'], "_");
    let pattern = dir.join(format!("{stem}-*.whl"));
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let not_found = || PinpackError::ArtifactInspectionFailed {
        path: dir.display().to_string(),
        reason: format!("no wheel for {name} was produced"),
    };

    let entries = glob::glob_with(&pattern.to_string_lossy(), options).map_err(|_| not_found())?;
    entries.filter_map(Result::ok).max().ok_or_else(not_found)
}

#[async_trait]
impl PackageBuilder for WheelBuilder {
    fn target(&self) -> PackageTarget {
        PackageTarget::Wheel
    }

    fn required_tools(&self) -> Vec<String> {
        vec![self.pip.clone()]
    }

    async fn build_dependency(
        &self,
        name: &PackageName,
        version: Option<&str>,
    ) -> Result<BuiltArtifact> {
        let requirement = match version {
            Some(version) => format!("{name}=={version}"),
            None => name.to_string(),
        };
        let tokens = self.wheel_command(&[], &requirement);
        self.run(&tokens, name, version).await
    }

    async fn artifact_dependencies(&self, artifact: &BuiltArtifact) -> Result<Vec<PackageName>> {
        let metadata = read_wheel_metadata(&artifact.path)?;
        let declared = parse_wheel_metadata(&metadata);
        debug!("{} requires {:?}", artifact.name, declared);
        Ok(declared)
    }

    fn project_command(&self, project: &ProjectBuild) -> Vec<String> {
        let source = project.descriptor.parent().filter(|p| !p.as_os_str().is_empty());
        let source = match (project.descriptor.is_dir(), source) {
            (false, Some(dir)) => dir.display().to_string(),
            _ => project.descriptor.display().to_string(),
        };
        self.wheel_command(&project.extra_args, &source)
    }

    async fn build_project(&self, project: &ProjectBuild) -> Result<BuiltArtifact> {
        if !project.dependency_flags.is_empty() {
            debug!("Wheel metadata declares dependencies itself; skipping explicit declarations");
        }
        let tokens = self.project_command(project);
        self.run(&tokens, &project.name, Some(&project.version)).await
    }
}

//! OS package builders driven by fpm.
//!
//! Dependencies are packaged straight from the package index (`fpm -s python
//! <name>`) and let fpm infer their dependencies; the project itself is packaged
//! from its descriptor with inference disabled and explicit `-d` declarations
//! instead. fpm reports the file it produced in its log output.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use super::command::{InvocationOptions, PackagingInvocation, PackagingProfile, build_command};
use super::inspect::{
    parse_debian_depends, parse_fpm_output, parse_rpm_requires, system_names_to_declared,
};
use super::{
    BuildContext, BuiltArtifact, PackageBuilder, PackageTarget, ProjectBuild,
    resolve_artifact_path,
};
use crate::config::PinpackConfig;
use crate::core::PinpackError;
use crate::naming::PackageName;
use crate::tools::ToolCommand;

/// fpm invocation shared by the deb and rpm builders.
#[derive(Debug, Clone)]
struct FpmPackager {
    profile: PackagingProfile,
    working_dir: PathBuf,
}

impl FpmPackager {
    fn new(config: &PinpackConfig, context: &BuildContext, target: &str) -> Self {
        let scheme = context
            .scheme
            .clone()
            .with_namespace_prefix(config.packaging.namespace_prefix.clone());
        Self {
            profile: PackagingProfile {
                program: config.tools.fpm.clone(),
                target: target.to_string(),
                packaging: config.packaging.clone(),
                before_remove: context.before_remove.clone(),
                scheme,
            },
            working_dir: context.working_dir.clone(),
        }
    }

    fn dependency_invocation(&self, name: &PackageName, version: Option<&str>) -> PackagingInvocation {
        build_command(
            &self.profile,
            name.as_str(),
            None,
            &InvocationOptions {
                version,
                ..Default::default()
            },
        )
    }

    fn project_invocation(&self, project: &ProjectBuild) -> PackagingInvocation {
        // Pass-through options first, then the explicit dependency declarations
        let extra_args: Vec<String> =
            project.extra_args.iter().chain(&project.dependency_flags).cloned().collect();
        build_command(
            &self.profile,
            project.name.as_str(),
            Some(&project.descriptor),
            &InvocationOptions {
                version: Some(&project.version),
                iteration: project.iteration.as_deref(),
                no_python_dependencies: true,
                extra_args: &extra_args,
            },
        )
    }

    /// Run fpm and return the artifact it reports.
    async fn run(
        &self,
        invocation: &PackagingInvocation,
        name: &PackageName,
        version: Option<&str>,
    ) -> Result<BuiltArtifact> {
        let output = ToolCommand::new(invocation.program())
            .args(invocation.args().iter().cloned())
            .current_dir(&self.working_dir)
            .with_context(name.as_str())
            .execute()
            .await?;

        let reported = parse_fpm_output(&output.stdout)
            .or_else(|| parse_fpm_output(&output.stderr))
            .ok_or_else(|| PinpackError::ArtifactInspectionFailed {
                path: self.working_dir.display().to_string(),
                reason: format!("fpm did not report a package path for {name}"),
            })?;
        let path = resolve_artifact_path(&self.working_dir, &reported);

        info!("Built {} -> {}", name, path.display());
        Ok(BuiltArtifact {
            name: name.clone(),
            version: invocation.version().map(str::to_string).or(version.map(str::to_string)),
            path,
        })
    }

    /// Declared dependencies from the OS package names an artifact depends on.
    fn declared(&self, system_names: &[String]) -> Vec<PackageName> {
        system_names_to_declared(
            system_names.iter().map(String::as_str),
            &self.profile.scheme,
            &self.profile.packaging.runtime_dependency,
        )
    }
}

/// Debian packages via `fpm -t deb`.
#[derive(Debug, Clone)]
pub struct DebianBuilder {
    fpm: FpmPackager,
    dpkg: String,
}

impl DebianBuilder {
    pub fn new(config: &PinpackConfig, context: BuildContext) -> Self {
        Self {
            fpm: FpmPackager::new(config, &context, "deb"),
            dpkg: config.tools.dpkg.clone(),
        }
    }
}

#[async_trait]
impl PackageBuilder for DebianBuilder {
    fn target(&self) -> PackageTarget {
        PackageTarget::Deb
    }

    fn required_tools(&self) -> Vec<String> {
        vec![self.fpm.profile.program.clone(), self.dpkg.clone()]
    }

    async fn build_dependency(
        &self,
        name: &PackageName,
        version: Option<&str>,
    ) -> Result<BuiltArtifact> {
        let invocation = self.fpm.dependency_invocation(name, version);
        self.fpm.run(&invocation, name, version).await
    }

    async fn artifact_dependencies(&self, artifact: &BuiltArtifact) -> Result<Vec<PackageName>> {
        let depends = ToolCommand::new(&self.dpkg)
            .arg("-f")
            .arg(artifact.path.display().to_string())
            .arg("Depends")
            .with_context(artifact.name.as_str())
            .execute_stdout()
            .await
            .with_context(|| format!("Failed to read Depends of {}", artifact.path.display()))?;

        let declared = self.fpm.declared(&parse_debian_depends(&depends));
        debug!("{} depends on {:?}", artifact.name, declared);
        Ok(declared)
    }

    fn project_command(&self, project: &ProjectBuild) -> Vec<String> {
        self.fpm.project_invocation(project).tokens().to_vec()
    }

    async fn build_project(&self, project: &ProjectBuild) -> Result<BuiltArtifact> {
        let invocation = self.fpm.project_invocation(project);
        self.fpm.run(&invocation, &project.name, Some(&project.version)).await
    }
}

/// RPM packages via `fpm -t rpm`.
#[derive(Debug, Clone)]
pub struct RpmBuilder {
    fpm: FpmPackager,
    rpm: String,
}

impl RpmBuilder {
    pub fn new(config: &PinpackConfig, context: BuildContext) -> Self {
        Self {
            fpm: FpmPackager::new(config, &context, "rpm"),
            rpm: config.tools.rpm.clone(),
        }
    }
}

#[async_trait]
impl PackageBuilder for RpmBuilder {
    fn target(&self) -> PackageTarget {
        PackageTarget::Rpm
    }

    fn required_tools(&self) -> Vec<String> {
        vec![self.fpm.profile.program.clone(), self.rpm.clone()]
    }

    async fn build_dependency(
        &self,
        name: &PackageName,
        version: Option<&str>,
    ) -> Result<BuiltArtifact> {
        let invocation = self.fpm.dependency_invocation(name, version);
        self.fpm.run(&invocation, name, version).await
    }

    async fn artifact_dependencies(&self, artifact: &BuiltArtifact) -> Result<Vec<PackageName>> {
        let requires = ToolCommand::new(&self.rpm)
            .args(["-qp", "--requires"])
            .arg(artifact.path.display().to_string())
            .with_context(artifact.name.as_str())
            .execute_stdout()
            .await
            .with_context(|| format!("Failed to read requires of {}", artifact.path.display()))?;

        let declared = self.fpm.declared(&parse_rpm_requires(&requires));
        debug!("{} requires {:?}", artifact.name, declared);
        Ok(declared)
    }

    fn project_command(&self, project: &ProjectBuild) -> Vec<String> {
        self.fpm.project_invocation(project).tokens().to_vec()
    }

    async fn build_project(&self, project: &ProjectBuild) -> Result<BuiltArtifact> {
        let invocation = self.fpm.project_invocation(project);
        self.fpm.run(&invocation, &project.name, Some(&project.version)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NameSchemeTable;
    use crate::test_utils::{init_test_logging, write_fake_tool};

    fn context() -> BuildContext {
        BuildContext {
            working_dir: PathBuf::from("/work"),
            before_remove: PathBuf::from("/stage/preremove"),
            scheme: NameSchemeTable::default(),
        }
    }

    fn project() -> ProjectBuild {
        ProjectBuild {
            name: PackageName::new("app"),
            descriptor: PathBuf::from("/work/setup.py"),
            version: "1.2.0".to_string(),
            iteration: Some("1".to_string()),
            dependency_flags: vec!["-d".to_string(), "python-puka >= 0.0.7".to_string()],
            extra_args: vec!["--deb-user".to_string(), "root".to_string()],
        }
    }

    #[test]
    fn test_project_command() {
        let builder = DebianBuilder::new(&PinpackConfig::default(), context());
        let tokens = builder.project_command(&project());

        assert_eq!(tokens[0], "fpm");
        assert!(tokens.contains(&"--version=1.2.0.1".to_string()));
        let n = tokens.len();
        assert_eq!(
            &tokens[n - 6..],
            [
                "--no-python-dependencies",
                "--deb-user",
                "root",
                "-d",
                "python-puka >= 0.0.7",
                "/work/setup.py"
            ]
        );
    }

    #[test]
    fn test_dependency_invocation_keeps_inference() {
        let builder = RpmBuilder::new(&PinpackConfig::default(), context());
        let invocation = builder.fpm.dependency_invocation(&PackageName::new("pyzmq"), Some("14.0"));

        assert_eq!(invocation.version(), Some("14.0"));
        assert!(invocation.args().windows(2).any(|w| w == ["--name", "python-zmq"]));
        assert!(invocation.args().windows(2).any(|w| w == ["-t", "rpm"]));
        assert!(!invocation.tokens().contains(&"--no-python-dependencies".to_string()));
        assert_eq!(invocation.tokens().last().map(String::as_str), Some("pyzmq"));
    }

    #[test]
    fn test_configured_prefix_reaches_declarations() {
        let mut config = PinpackConfig::default();
        config.packaging.namespace_prefix = "python3-".to_string();
        let builder = DebianBuilder::new(&config, context());

        let declared = builder.fpm.declared(&[
            "python".to_string(),
            "python3-yaml".to_string(),
            "python-requests".to_string(),
        ]);
        assert_eq!(declared, vec![PackageName::new("pyyaml")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_build_dependency_with_fake_fpm() {
        init_test_logging(None);
        let temp = tempfile::TempDir::new().unwrap();
        let fake = write_fake_tool(
            &temp.path().join("fpm"),
            "echo '{:timestamp=>\"now\", :message=>\"Created package\", :path=>\"python-puka_0.0.7_all.deb\"}'",
        )
        .unwrap();

        let mut config = PinpackConfig::default();
        config.tools.fpm = fake.display().to_string();
        let mut context = context();
        context.working_dir = temp.path().to_path_buf();

        let builder = DebianBuilder::new(&config, context);
        let artifact = builder
            .build_dependency(&PackageName::new("puka"), Some("0.0.7"))
            .await
            .unwrap();
        assert_eq!(artifact.path, temp.path().join("python-puka_0.0.7_all.deb"));
        assert_eq!(artifact.version.as_deref(), Some("0.0.7"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_path_in_output_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let fake = write_fake_tool(&temp.path().join("fpm"), "echo 'nothing'").unwrap();

        let mut config = PinpackConfig::default();
        config.tools.fpm = fake.display().to_string();
        let mut context = context();
        context.working_dir = temp.path().to_path_buf();

        let err = DebianBuilder::new(&config, context)
            .build_dependency(&PackageName::new("puka"), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PinpackError>(),
            Some(PinpackError::ArtifactInspectionFailed { .. })
        ));
    }
}

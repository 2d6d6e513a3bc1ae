//! Packaging tool command lines.
//!
//! [`build_command`] is a pure function: the same inputs always produce the same
//! tokens in the same order, and nothing here touches the filesystem or spawns a
//! process. Running the invocation is the builders' job.

use std::path::{Path, PathBuf};

use crate::config::PackagingConfig;
use crate::naming::NameSchemeTable;

/// Fixed per-run settings shared by every invocation.
#[derive(Debug, Clone)]
pub struct PackagingProfile {
    /// Packaging tool executable (first token)
    pub program: String,
    /// Output package type passed to `-t` (`deb`, `rpm`)
    pub target: String,
    /// Metadata and install layout
    pub packaging: PackagingConfig,
    /// Uninstall hook script
    pub before_remove: PathBuf,
    /// Broken scheme names and namespace prefix
    pub scheme: NameSchemeTable,
}

/// Per-invocation options.
#[derive(Debug, Clone, Default)]
pub struct InvocationOptions<'a> {
    /// Version to stamp on the package
    pub version: Option<&'a str>,
    /// Hotfix iteration, joined to the version as `version.iteration`
    pub iteration: Option<&'a str>,
    /// Suppress the tool's own dependency inference
    pub no_python_dependencies: bool,
    /// Tokens appended verbatim before the positional argument
    pub extra_args: &'a [String],
}

/// One packaging tool call, as an ordered token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagingInvocation {
    tokens: Vec<String>,
}

impl PackagingInvocation {
    /// All tokens, starting with the program.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// Arguments after the program.
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// Version flag value, if the invocation carries one.
    pub fn version(&self) -> Option<&str> {
        self.tokens.iter().find_map(|token| token.strip_prefix("--version="))
    }
}

impl std::fmt::Display for PackagingInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// Join a version and an optional iteration.
pub fn emitted_version(version: &str, iteration: Option<&str>) -> String {
    match iteration {
        Some(iteration) if !iteration.is_empty() => format!("{version}.{iteration}"),
        _ => version.to_string(),
    }
}

/// Assemble the packaging tool invocation for `pkg_name`.
///
/// The trailing positional argument is `source_path` when given, else the bare
/// package name (for the tool to fetch from the package index).
pub fn build_command(
    profile: &PackagingProfile,
    pkg_name: &str,
    source_path: Option<&Path>,
    options: &InvocationOptions<'_>,
) -> PackagingInvocation {
    let packaging = &profile.packaging;
    let mut tokens = vec![profile.program.clone()];

    if let Some(name) = profile.scheme.package_name_override(pkg_name) {
        tokens.push("--name".to_string());
        tokens.push(name);
    }

    if let Some(version) = options.version {
        tokens.push(format!("--version={}", emitted_version(version, options.iteration)));
    }

    tokens.extend([
        "-s".to_string(),
        "python".to_string(),
        "-t".to_string(),
        profile.target.clone(),
        "-f".to_string(),
        format!("--maintainer={}", packaging.maintainer),
        "--exclude=*.pyc".to_string(),
        "--exclude=*.pyo".to_string(),
        format!("--depends={}", packaging.runtime_dependency),
        format!("--category={}", packaging.category),
        format!("--python-bin={}", packaging.python_bin),
        "--template-scripts".to_string(),
        format!("--python-install-lib={}", packaging.install_lib),
        format!("--python-install-bin={}", packaging.install_bin),
        format!("--before-remove={}", profile.before_remove.display()),
    ]);

    if options.no_python_dependencies {
        tokens.push("--no-python-dependencies".to_string());
    }

    tokens.extend(options.extra_args.iter().cloned());

    tokens.push(match source_path {
        Some(path) => path.display().to_string(),
        None => pkg_name.to_string(),
    });

    PackagingInvocation {
        tokens,
    }
}

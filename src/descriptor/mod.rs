//! Reading the direct dependencies a Python project declares.
//!
//! A project descriptor is the project's `setup.py`, `setup.cfg` or
//! `pyproject.toml`. [`DescriptorReader`] looks for requirements in that order and
//! returns the first declaration it finds, stripped down to package names:
//!
//! - `setup.py` is scanned statically; only when `install_requires` is computed
//!   at runtime is it evaluated in a child interpreter (see [`evaluate`]).
//! - `setup.cfg` is read from `[options] install_requires`, including
//!   `file:` references.
//! - `pyproject.toml` is read from `[project] dependencies`.
//!
//! Reading is best effort: unreadable or missing descriptors yield no dependencies
//! and a warning, never an error.

pub mod evaluate;
pub mod setup_py;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ini::IniDocument;
use crate::naming::PackageName;
use setup_py::DeclaredRequires;

/// File names recognized as project descriptors, in lookup order.
pub const DESCRIPTOR_FILES: &[&str] = &["setup.py", "setup.cfg", "pyproject.toml"];

/// Characters that end the name part of a requirement string.
const NAME_TERMINATORS: &[char] = &['=', '<', '>', '~', '!', ';', '[', '(', '@', ',', '#'];

/// Reduce a requirement string to its package name.
///
/// `"Test2<=2.0.0"` becomes `test2`, `"requests[security]>=2; python_version<'3'"`
/// becomes `requests`. Blank lines, comments, pip options (`-r`, `-e`) and bare
/// URLs yield `None`.
pub fn strip_requirement(requirement: &str) -> Option<PackageName> {
    let requirement = requirement.trim();
    if requirement.is_empty() || requirement.starts_with(['#', '-']) {
        return None;
    }

    let end = requirement
        .find(|c: char| NAME_TERMINATORS.contains(&c) || c.is_whitespace())
        .unwrap_or(requirement.len());
    let name = &requirement[..end];
    if name.is_empty() || name.contains([':', '/']) {
        return None;
    }

    Some(PackageName::new(name))
}

/// Strip every requirement, dropping unusable entries and repeated names.
pub fn strip_requirements<I, S>(requirements: I) -> Vec<PackageName>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    requirements
        .into_iter()
        .filter_map(|requirement| strip_requirement(requirement.as_ref()))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Reads declared dependencies from project descriptors.
#[derive(Debug, Clone, Default)]
pub struct DescriptorReader {
    /// Interpreter for dynamic `setup.py` files; `None` disables evaluation
    python: Option<PathBuf>,
}

impl DescriptorReader {
    /// Reader that evaluates dynamic `setup.py` files with `python`.
    pub fn new(python: Option<PathBuf>) -> Self {
        Self {
            python,
        }
    }

    /// Reader that never runs Python.
    pub fn static_only() -> Self {
        Self::default()
    }

    /// Direct dependencies declared by the descriptor at `path`.
    ///
    /// `path` is either a descriptor file or a project directory. For a file, that
    /// file is read first and the other descriptors next to it are consulted only if
    /// it declares nothing.
    pub async fn read_dependencies(&self, path: &Path) -> Vec<PackageName> {
        debug!("Reading dependencies from {}", path.display());

        let candidates = descriptor_candidates(path);
        if candidates.is_empty() {
            warn!("No project descriptor found at {}", path.display());
            return Vec::new();
        }

        for candidate in candidates {
            if let Some(requirements) = self.read_descriptor(&candidate).await {
                let names = strip_requirements(&requirements);
                debug!("{} declares: {:?}", candidate.display(), names);
                return names;
            }
        }

        debug!("No dependencies declared at {}", path.display());
        Vec::new()
    }

    /// Raw requirement strings of one descriptor, or `None` if it declares none.
    async fn read_descriptor(&self, path: &Path) -> Option<Vec<String>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                return None;
            }
        };

        match path.file_name().and_then(|name| name.to_str()) {
            Some("setup.cfg") => read_setup_cfg(&content, path),
            Some("pyproject.toml") => read_pyproject(&content),
            _ => match setup_py::extract_install_requires(&content) {
                DeclaredRequires::Literal(requires) => Some(requires),
                DeclaredRequires::Absent => None,
                DeclaredRequires::Dynamic => match &self.python {
                    Some(python) => {
                        debug!("install_requires in {} is dynamic, evaluating", path.display());
                        Some(evaluate::evaluate_setup_py(python, path).await)
                    }
                    None => {
                        warn!(
                            "install_requires in {} is computed at runtime and no interpreter \
                             is available; ignoring it",
                            path.display()
                        );
                        None
                    }
                },
            },
        }
    }
}

/// Existing descriptor files for `path`, in lookup order.
fn descriptor_candidates(path: &Path) -> Vec<PathBuf> {
    let (dir, first) = if path.is_dir() {
        (path.to_path_buf(), None)
    } else if path.is_file() {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        (dir, Some(path.to_path_buf()))
    } else {
        return Vec::new();
    };

    let mut candidates: Vec<PathBuf> = first.into_iter().collect();
    for name in DESCRIPTOR_FILES {
        let candidate = dir.join(name);
        if candidate.is_file() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// `[options] install_requires` of a `setup.cfg`.
fn read_setup_cfg(content: &str, path: &Path) -> Option<Vec<String>> {
    let document = match IniDocument::parse(content) {
        Ok(document) => document,
        Err(e) => {
            warn!("Could not parse {}: {}", path.display(), e);
            return None;
        }
    };
    let value = document.section("options")?.get("install_requires")?;

    // `file: requirements.txt, more.txt` reads the listed files instead
    if let Some(files) = value.trim().strip_prefix("file:") {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut requires = Vec::new();
        for file in files.split([',', '\n']).map(str::trim).filter(|f| !f.is_empty()) {
            match std::fs::read_to_string(dir.join(file)) {
                Ok(text) => requires.extend(text.lines().map(str::to_string)),
                Err(e) => warn!("Could not read {} referenced from {}: {}", file, path.display(), e),
            }
        }
        return Some(requires);
    }

    Some(value.lines().map(str::to_string).collect())
}

/// `[project] dependencies` of a `pyproject.toml`.
///
/// A project that lists `dependencies` under `dynamic` declares nothing here.
fn read_pyproject(content: &str) -> Option<Vec<String>> {
    let document: toml::Table = match toml::from_str(content) {
        Ok(document) => document,
        Err(e) => {
            warn!("Could not parse pyproject.toml: {}", e.message());
            return None;
        }
    };
    let project = document.get("project")?.as_table()?;

    let dependencies = project.get("dependencies")?.as_array()?;
    Some(dependencies.iter().filter_map(|value| value.as_str()).map(str::to_string).collect())
}

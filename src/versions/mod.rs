//! Pinned versions table.
//!
//! Known-good versions are recorded in a buildout-style INI file:
//!
//! ```ini
//! [buildout]
//! extends = base.cfg
//!
//! [versions]
//! PyYAML = 3.10
//! requests = 2.2.1
//! puka = 0.0.7
//! ```
//!
//! Only the `[versions]` section is read. Keys are package names (normalized to
//! lowercase), values are opaque version strings. A name missing from the table is
//! "unpinned" and is still built, just without a version.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ini::IniDocument;
use crate::core::PinpackError;
use crate::naming::PackageName;

/// Section holding the pinned versions.
pub const VERSIONS_SECTION: &str = "versions";

/// File picked up from the project directory when no versions file is given.
pub const DEFAULT_VERSIONS_FILE: &str = "versions.cfg";

/// Flat mapping from package name to pinned version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionsTable {
    entries: HashMap<PackageName, String>,
    origin: Option<PathBuf>,
}

impl VersionsTable {
    /// An empty table: every lookup is unpinned.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the `[versions]` section of `path`.
    ///
    /// # Errors
    ///
    /// - [`PinpackError::VersionsFileNotFound`] if the file does not exist
    /// - [`PinpackError::VersionsFileParse`] if the file is not valid INI
    /// - [`PinpackError::IoError`] if the file cannot be read
    pub fn load(path: &Path) -> Result<Self, PinpackError> {
        if !path.is_file() {
            return Err(PinpackError::VersionsFileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut table = Self::parse(&content).map_err(|reason| PinpackError::VersionsFileParse {
            path: path.display().to_string(),
            reason,
        })?;
        table.origin = Some(path.to_path_buf());

        debug!("Loaded {} pinned versions from {}", table.len(), path.display());
        Ok(table)
    }

    /// Pick the versions table for a project.
    ///
    /// An explicit path must exist. Without one, `<project_dir>/versions.cfg` is used
    /// when present; otherwise the table is empty and every dependency is unpinned.
    pub fn load_for_project(
        explicit: Option<&Path>,
        project_dir: &Path,
    ) -> Result<Self, PinpackError> {
        if let Some(path) = explicit {
            let path = if path.is_relative() {
                project_dir.join(path)
            } else {
                path.to_path_buf()
            };
            return Self::load(&path);
        }

        let default_path = project_dir.join(DEFAULT_VERSIONS_FILE);
        if default_path.is_file() {
            return Self::load(&default_path);
        }

        warn!(
            "No versions file given and {} does not exist; all dependencies are unpinned",
            default_path.display()
        );
        Ok(Self::empty())
    }

    /// Parse INI text and keep the `[versions]` section.
    ///
    /// Text before the first section header is an error. A file without a
    /// `[versions]` section parses to an empty table.
    pub fn parse(content: &str) -> Result<Self, String> {
        let document = IniDocument::parse(content)?;

        let Some(section) = document.section(VERSIONS_SECTION) else {
            warn!("Versions file has no [{VERSIONS_SECTION}] section");
            return Ok(Self::empty());
        };

        let entries = section
            .entries()
            .map(|(name, version)| (PackageName::new(name), version.to_string()))
            .collect();

        Ok(Self {
            entries,
            origin: None,
        })
    }

    /// Pinned version for `name`, or `None` when unpinned. Case-insensitive.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries.get(PackageName::new(name).as_str()).map(String::as_str)
    }

    /// Number of pinned packages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pinned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File the table was loaded from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }
}

impl<N, V> FromIterator<(N, V)> for VersionsTable
where
    N: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, v)| (PackageName::new(n), v.into())).collect(),
            origin: None,
        }
    }
}

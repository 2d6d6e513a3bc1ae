//! Configuration management for pinpack
//!
//! pinpack reads two kinds of configuration:
//!
//! 1. **Versions files** (`versions.cfg`, INI) - pinned dependency versions, see
//!    [`crate::versions`]. Parsed with the [`ini`] reader.
//! 2. **pinpack configuration** (`pinpack.toml`, TOML) - packaging metadata and the
//!    external tools to run. Every key is optional; the defaults reproduce the
//!    classic Debian python packaging layout.
//!
//! # Configuration Lookup
//!
//! The first existing file wins:
//!
//! 1. `--config <path>` (must exist)
//! 2. `<project>/pinpack.toml`
//! 3. `<user config dir>/pinpack/config.toml` (e.g. `~/.config/pinpack/config.toml`)
//!
//! # Example
//!
//! ```toml
//! [packaging]
//! maintainer = "Release Team <release@example.com>"
//! category = "python"
//! install_lib = "/usr/lib/python3/dist-packages/"
//! namespace_prefix = "python3-"
//!
//! [tools]
//! fpm = "/opt/fpm/bin/fpm"
//! pip = "pip3"
//! ```

pub mod ini;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::PinpackError;
use crate::naming::DEFAULT_NAMESPACE_PREFIX;

/// Name of the project-level configuration file.
pub const CONFIG_FILE_NAME: &str = "pinpack.toml";

/// Top-level `pinpack.toml` structure.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PinpackConfig {
    /// Metadata and install layout passed to the packaging tool
    pub packaging: PackagingConfig,
    /// External executables
    pub tools: ToolsConfig,
}

/// `[packaging]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PackagingConfig {
    /// Value of `--maintainer`
    pub maintainer: String,
    /// Value of `--category`
    pub category: String,
    /// Baseline runtime dependency every package declares (`--depends`)
    pub runtime_dependency: String,
    /// Interpreter recorded in the package (`--python-bin`)
    pub python_bin: String,
    /// Library install location (`--python-install-lib`)
    pub install_lib: String,
    /// Script install location (`--python-install-bin`)
    pub install_bin: String,
    /// Prefix of OS package names built from Python packages
    pub namespace_prefix: String,
    /// Uninstall hook script; the bundled script is used when unset
    pub before_remove: Option<PathBuf>,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            maintainer: "CSI".to_string(),
            category: "python".to_string(),
            runtime_dependency: "python".to_string(),
            python_bin: "/usr/bin/python".to_string(),
            install_lib: "/usr/lib/python2.7/dist-packages/".to_string(),
            install_bin: "/usr/local/bin/".to_string(),
            namespace_prefix: DEFAULT_NAMESPACE_PREFIX.to_string(),
            before_remove: None,
        }
    }
}

/// `[tools]` section: executable names (looked up on `PATH`) or paths.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Packaging tool
    pub fpm: String,
    /// Package index client, used for wheels
    pub pip: String,
    /// Interpreter used to evaluate dynamic `setup.py` files
    pub python: String,
    /// Debian package inspector
    pub dpkg: String,
    /// RPM package inspector
    pub rpm: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            fpm: "fpm".to_string(),
            pip: "pip".to_string(),
            python: "python3".to_string(),
            dpkg: "dpkg".to_string(),
            rpm: "rpm".to_string(),
        }
    }
}

impl PinpackConfig {
    /// Load the configuration for a project, falling back to defaults.
    ///
    /// An explicitly requested file must exist; the implicit locations are optional.
    pub fn load(explicit: Option<&Path>, project_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(PinpackError::ConfigError {
                    message: format!("config file {} does not exist", path.display()),
                }
                .into());
            }
            return parse_config(path);
        }

        let candidates = [Some(project_dir.join(CONFIG_FILE_NAME)), Self::user_config_path()];
        for candidate in candidates.into_iter().flatten() {
            if candidate.is_file() {
                debug!("Using configuration from {}", candidate.display());
                return parse_config(&candidate);
            }
        }

        debug!("No pinpack configuration found, using defaults");
        Ok(Self::default())
    }

    /// Per-user configuration file location.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pinpack").join("config.toml"))
    }
}

/// Parse a TOML configuration file into the specified type.
///
/// Errors carry the file path; TOML syntax and schema errors are reported as
/// [`PinpackError::ConfigError`].
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content).map_err(|e| PinpackError::ConfigError {
        message: format!("{}: {}", path.display(), e.message()),
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PinpackConfig::default();
        assert_eq!(config.packaging.maintainer, "CSI");
        assert_eq!(config.packaging.namespace_prefix, "python-");
        assert_eq!(config.tools.fpm, "fpm");
        assert!(config.packaging.before_remove.is_none());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[packaging]\nmaintainer = \"Ops\"\n\n[tools]\nfpm = \"/opt/fpm\"\n",
        )
        .unwrap();

        let config = PinpackConfig::load(None, temp.path()).unwrap();
        assert_eq!(config.packaging.maintainer, "Ops");
        assert_eq!(config.packaging.category, "python");
        assert_eq!(config.tools.fpm, "/opt/fpm");
        assert_eq!(config.tools.dpkg, "dpkg");
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let temp = TempDir::new().unwrap();
        let err = PinpackConfig::load(Some(&temp.path().join("missing.toml")), temp.path())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PinpackError>(),
            Some(PinpackError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        std::fs::write(&path, "[packaging]\nmaintainr = \"typo\"\n").unwrap();

        let err = PinpackConfig::load(Some(&path), temp.path()).unwrap_err();
        assert!(err.to_string().contains("custom.toml"));
    }
}

//! The `set-version` command.

use anyhow::Result;
use clap::Args;

use crate::builder::{EXIT_OK, ReleaseVersion, set_package_version};

/// Prepare the project's sources for a release version.
///
/// The version reaches the packages through `build --package-version`; this
/// command exists so release tooling can call both steps uniformly.
#[derive(Args, Debug)]
pub struct SetVersionCommand {
    /// The release version
    #[arg(value_name = "VERSION")]
    release: String,

    /// The version comes from an annotated tag
    #[arg(long)]
    annotated: bool,

    /// Release notes of the annotated tag
    #[arg(long, value_name = "TEXT")]
    changelog: Option<String>,
}

impl SetVersionCommand {
    pub fn execute(self) -> Result<i32> {
        set_package_version(&ReleaseVersion {
            version: self.release,
            annotated: self.annotated,
            changelog: self.changelog,
        })?;
        Ok(EXIT_OK)
    }
}

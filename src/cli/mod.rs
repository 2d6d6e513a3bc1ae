//! Command-line interface for pinpack.
//!
//! pinpack is driven by release tooling, so the command tree is small:
//!
//! - `build` - build the project and its pinned dependencies into packages
//! - `set-version` - prepare the sources for a release version
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--no-progress` - Disable the build spinner
//! - `--config` - Path to a `pinpack.toml`
//!
//! # Example
//!
//! ```bash
//! # Build version 1.2.0 with the pins from versions.cfg
//! pinpack build --package-version 1.2.0 -- --iteration 2 -i '^vdt'
//!
//! # See the project's fpm command line without building anything
//! pinpack build --package-version 1.2.0 --dry-run
//! ```

mod build;
mod set_version;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::utils::progress::NO_PROGRESS_ENV;

/// Main CLI structure for pinpack.
///
/// Global options are available to all subcommands.
#[derive(Parser, Debug)]
#[command(
    name = "pinpack",
    about = "Build Python projects and their pinned dependencies into OS packages",
    version,
    long_about = "pinpack reads a project's dependencies, pins them against a buildout versions \
                  file, packages every dependency recursively with fpm and finally packages the \
                  project itself with explicit, version-constrained dependency declarations."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output, including every tool command line.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a pinpack.toml, instead of `<project>/pinpack.toml` or the user config.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable the progress spinner.
    ///
    /// Also disabled by setting `PINPACK_NO_PROGRESS`, and skipped automatically
    /// when stderr is not a terminal.
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the project and its pinned dependencies.
    ///
    /// See [`build::BuildCommand`] for the options and pass-through arguments.
    Build(build::BuildCommand),

    /// Prepare the project's sources for a release version.
    SetVersion(set_version::SetVersionCommand),
}

impl Cli {
    /// Execute the parsed command and return the process exit status.
    ///
    /// # Returns
    ///
    /// - `Ok(0)` when the run completed
    /// - `Ok(2)` for a `--strict` build in which a dependency failed
    /// - `Err(_)` for fatal errors; `main` reports them and exits with 1
    pub async fn execute(self) -> Result<i32> {
        self.init_logging();
        let show_progress = self.progress_enabled();

        match self.command {
            Commands::Build(cmd) => cmd.execute(self.config, show_progress).await,
            Commands::SetVersion(cmd) => cmd.execute(),
        }
    }

    /// Log filter for the global verbosity flags.
    fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    /// Install the stderr subscriber; `RUST_LOG` wins over the verbosity flags.
    fn init_logging(&self) {
        let filter = if std::env::var_os("RUST_LOG").is_some() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.log_filter())
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(self.verbose)
            .try_init();
    }

    /// Whether the spinner may draw, taking the environment into account.
    pub fn progress_enabled(&self) -> bool {
        !self.no_progress && std::env::var_os(NO_PROGRESS_ENV).is_none()
    }
}

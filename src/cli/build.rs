//! The `build` command.
//!
//! Everything after the command's own options is handed to [`BuildArgs`]: the
//! build options pinpack recognizes are taken out, the rest reaches fpm verbatim.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::builder::{BuildArgs, BuildReport, BuildRequest, EXIT_OK, build_package};

/// Build the project in `--project-dir` and its pinned dependencies.
///
/// # Examples
///
/// ```bash
/// pinpack build --package-version 1.2.0
/// pinpack build --package-version 1.2.0 --strict -- --versions-file pins.cfg -i '^vdt'
/// pinpack build --package-version 1.2.0 -- --target rpm --rpm-os linux
/// ```
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Version of the project being released
    #[arg(long, value_name = "VERSION")]
    package_version: String,

    /// Directory containing the project's setup.py
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Print the project's packaging command instead of building anything
    #[arg(long)]
    dry_run: bool,

    /// Exit with status 2 when any dependency failed to build
    #[arg(long)]
    strict: bool,

    /// Build options (--include, --versions-file, --iteration, --pin-exact,
    /// --pin-greater-or-equal, --target) and arguments passed through to fpm
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    plugin_args: Vec<String>,
}

impl BuildCommand {
    pub async fn execute(self, config_path: Option<PathBuf>, show_progress: bool) -> Result<i32> {
        let args = BuildArgs::parse(&self.plugin_args)?;

        let request = BuildRequest {
            project_dir: self.project_dir,
            version: self.package_version,
            args,
            config_path,
            dry_run: self.dry_run,
            show_progress,
        };

        let report = build_package(&request).await?;

        if request.dry_run {
            println!("{}", shell_join(&report.project_command));
            return Ok(EXIT_OK);
        }

        print_report(&report);
        Ok(report.exit_code(self.strict))
    }
}

fn print_report(report: &BuildReport) {
    for artifact in &report.built {
        println!("{} {}", "✓".green(), artifact.path.display());
    }
    for conflict in &report.conflicts {
        println!("{} pin conflict for {}", "!".yellow(), conflict);
    }
    for failed in &report.failed {
        println!("{} {}: {}", "✗".red(), failed.name, failed.reason);
    }
    if let Some(project) = &report.project {
        println!("{} {} (project)", "✓".green().bold(), project.path.display());
    }
    println!("{}", report.summary());
}

/// Join tokens into a line a shell would split back into the same tokens.
fn shell_join(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|token| {
            let special = |c: char| c.is_whitespace() || "'\"$*?;&|<>".contains(c);
            if token.is_empty() || token.contains(special) {
                format!("'{}'", token.replace('\'', r"'\''"))
            } else {
                token.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

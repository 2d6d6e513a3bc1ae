//! pinpack CLI entry point
//!
//! Parses the command line, runs the command and turns fatal errors into a
//! user-friendly report on stderr.
//!
//! Exit status:
//! - `0` the run completed
//! - `1` a fatal error (configuration, cleanup or the project's own packaging)
//! - `2` a `--strict` build in which a dependency failed

use anyhow::Result;
use clap::Parser;
use pinpack_cli::cli;
use pinpack_cli::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}

//! Builder for running external tools (fpm, pip, dpkg, rpm, python).
//!
//! Every subprocess pinpack starts goes through [`ToolCommand`], so command lines are
//! logged the same way and failures turn into [`PinpackError::ToolCommandFailed`].

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::core::PinpackError;

/// Builder for one external tool invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use pinpack_cli::tools::ToolCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let output = ToolCommand::new("dpkg")
///     .args(["-f", "python-puka_0.0.7_all.deb", "Depends"])
///     .with_context("puka")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
///
/// There is no timeout: a hanging tool blocks the build, which is left to whatever
/// supervises pinpack itself.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    /// Executable to run (name on `PATH` or a path)
    program: PathBuf,

    /// Arguments in order
    args: Vec<String>,

    /// Working directory for the child process
    current_dir: Option<PathBuf>,

    /// Extra environment variables for the child
    env_vars: Vec<(String, String)>,

    /// Optional context string, prefixed to log lines
    context: Option<String>,
}

impl ToolCommand {
    /// Creates a command for `program` with no arguments.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            context: None,
        }
    }

    /// Sets the working directory of the child process.
    ///
    /// The parent's working directory is never changed.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds an environment variable for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Set a context for logging (e.g. the package being built)
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The arguments collected so far.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Tool name used as the tracing target and in error messages.
    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Command line as a single string, for logging and dry runs.
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Execute the command, capturing its output.
    ///
    /// A non-zero exit becomes [`PinpackError::ToolCommandFailed`] carrying stderr
    /// (or stdout when stderr is empty).
    pub async fn execute(self) -> Result<ToolOutput> {
        let start = std::time::Instant::now();
        let tool = self.tool_name();
        let command_line = self.display_command();

        match &self.context {
            Some(ctx) => tracing::debug!(target: "tool", "({}) Executing command: {}", ctx, command_line),
            None => tracing::debug!(target: "tool", "Executing command: {}", command_line),
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env_vars {
            tracing::trace!(target: "tool", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Failed to execute {command_line}"))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "tool",
                "{} failed with exit code: {:?}",
                tool,
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "tool", "Error: {}", stderr.trim());
            }

            return Err(PinpackError::ToolCommandFailed {
                tool,
                code: output.status.code(),
                stderr: if stderr.trim().is_empty() { stdout } else { stderr },
            }
            .into());
        }

        if !stdout.trim().is_empty() {
            match &self.context {
                Some(ctx) => tracing::debug!(target: "tool", "({}) {}", ctx, stdout.trim()),
                None => tracing::debug!(target: "tool", "{}", stdout.trim()),
            }
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::debug!(target: "tool::perf", "{} took {:.2}s", tool, elapsed.as_secs_f64());
        }

        Ok(ToolOutput {
            stdout,
            stderr,
        })
    }

    /// Execute the command and return only stdout, trimmed
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }
}

/// Output of a successful tool run
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

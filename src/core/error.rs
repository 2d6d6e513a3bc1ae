//! Error handling for pinpack
//!
//! This module provides the strongly-typed error enum used across the crate and the
//! user-friendly error reporting used by the CLI. The error system follows two rules:
//! 1. **Strongly-typed errors** for the failure modes callers branch on
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Configuration**: [`PinpackError::ConfigError`], [`PinpackError::VersionsFileNotFound`],
//!   [`PinpackError::VersionsFileParse`], [`PinpackError::InvalidArgument`]
//! - **External tools**: [`PinpackError::ToolNotFound`], [`PinpackError::ToolCommandFailed`],
//!   [`PinpackError::ArtifactInspectionFailed`]
//! - **Filesystem**: [`PinpackError::CleanupFailed`], [`PinpackError::IoError`]
//!
//! Only configuration and cleanup failures are fatal for a build run. Tool failures
//! for individual dependencies are absorbed by the dependency builder and recorded
//! in the build report.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pinpack_cli::core::{PinpackError, user_friendly_error};
//!
//! let error = PinpackError::VersionsFileNotFound {
//!     path: "versions.cfg".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for pinpack operations.
///
/// Each variant carries the context needed to explain the failure to a user:
/// the offending path, tool name, or captured tool output.
#[derive(Error, Debug)]
pub enum PinpackError {
    /// Configuration file (`pinpack.toml`) could not be read or is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// The versions file that was explicitly requested does not exist
    #[error("Versions file not found: {path}")]
    VersionsFileNotFound {
        /// Path that was requested
        path: String,
    },

    /// The versions file exists but could not be parsed
    #[error("Invalid versions file {path}: {reason}")]
    VersionsFileParse {
        /// Path to the versions file
        path: String,
        /// Line-level reason for the failure
        reason: String,
    },

    /// A build option had an unusable value (bad include regex, bad iteration)
    #[error("Invalid argument {argument}: {reason}")]
    InvalidArgument {
        /// The option as given on the command line
        argument: String,
        /// Why it was rejected
        reason: String,
    },

    /// A required external executable could not be located
    #[error("Required tool '{tool}' was not found")]
    ToolNotFound {
        /// Executable name or configured path
        tool: String,
    },

    /// An external tool exited unsuccessfully
    #[error("{tool} failed{}", code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    ToolCommandFailed {
        /// Executable that was run
        tool: String,
        /// Process exit code, if the process exited normally
        code: Option<i32>,
        /// Captured standard error (or standard output when stderr is empty)
        stderr: String,
    },

    /// A produced artifact could not be inspected for its dependencies
    #[error("Failed to inspect artifact {path}: {reason}")]
    ArtifactInspectionFailed {
        /// Artifact path
        path: String,
        /// Reason for the failure
        reason: String,
    },

    /// A stale artifact could not be removed before building
    #[error("Failed to remove stale artifact {path}: {reason}")]
    CleanupFailed {
        /// Artifact that could not be removed
        path: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Catch-all for errors without a dedicated variant
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information.
///
/// Wraps a [`PinpackError`] with an optional suggestion (displayed in green) and
/// optional details (displayed in yellow).
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying pinpack error
    pub error: PinpackError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`PinpackError`]
    #[must_use]
    pub const fn new(error: PinpackError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`PinpackError`] anywhere in the error chain and [`std::io::Error`]
/// kinds; everything else is wrapped as [`PinpackError::Other`] with the full
/// context chain as details.
///
/// # Examples
///
/// ```rust,no_run
/// use pinpack_cli::core::user_friendly_error;
///
/// let error = anyhow::anyhow!("Something went wrong");
/// let context = user_friendly_error(error);
/// context.display();
/// ```
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain = format!("{error:#}");

    let error = match error.downcast::<ErrorContext>() {
        Ok(ctx) => return ctx,
        Err(error) => error,
    };

    let error = match error.downcast::<PinpackError>() {
        Ok(pinpack_error) => return create_error_context(pinpack_error),
        Err(error) => error,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(PinpackError::Other {
                message: error.to_string(),
            })
            .with_suggestion("Check file ownership and permissions of the project directory")
            .with_details(chain);
        }
    }

    // Typed errors wrapped in anyhow context are found in the chain
    for cause in error.chain() {
        if let Some(PinpackError::ToolNotFound { tool }) = cause.downcast_ref::<PinpackError>() {
            return create_error_context(PinpackError::ToolNotFound { tool: tool.clone() })
                .with_details(chain);
        }
    }

    ErrorContext::new(PinpackError::Other {
        message: error.to_string(),
    })
    .with_details(chain)
}

fn create_error_context(error: PinpackError) -> ErrorContext {
    match &error {
        PinpackError::VersionsFileNotFound { path } => {
            let suggestion = format!(
                "Check the --versions-file path ({path}) or omit the option to build with unpinned dependencies"
            );
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("An explicitly requested versions file must exist before any package is built")
        }
        PinpackError::VersionsFileParse { .. } => ErrorContext::new(error)
            .with_suggestion("The versions file must contain a [versions] section of 'name = version' lines")
            .with_details("Only the [versions] section is read; other sections are ignored"),
        PinpackError::ToolNotFound { tool } => {
            let suggestion = format!(
                "Install '{tool}' or point the [tools] section of pinpack.toml at the executable"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        PinpackError::CleanupFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Remove the stale packages manually or fix the directory permissions")
            .with_details("Building on top of stale artifacts could mix old and new packages"),
        PinpackError::InvalidArgument { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'pinpack build --help' for the accepted options"),
        PinpackError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax and keys of pinpack.toml"),
        PinpackError::ToolCommandFailed { stderr, .. } if !stderr.trim().is_empty() => {
            let details = stderr.trim().to_string();
            ErrorContext::new(error).with_details(details)
        }
        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PinpackError::ToolCommandFailed {
            tool: "fpm".to_string(),
            code: Some(2),
            stderr: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "fpm failed with exit code 2");

        let err = PinpackError::ToolCommandFailed {
            tool: "fpm".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "fpm failed");
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(PinpackError::ToolNotFound {
            tool: "fpm".to_string(),
        })
        .with_suggestion("Install fpm")
        .with_details("fpm builds the packages");

        let display = format!("{ctx}");
        assert!(display.contains("Required tool 'fpm' was not found"));
        assert!(display.contains("Details: fpm builds the packages"));
        assert!(display.contains("Suggestion: Install fpm"));
    }

    #[test]
    fn test_user_friendly_versions_file_error() {
        let error = anyhow::Error::from(PinpackError::VersionsFileNotFound {
            path: "missing.cfg".to_string(),
        });
        let ctx = user_friendly_error(error);
        assert!(matches!(ctx.error, PinpackError::VersionsFileNotFound { .. }));
        assert!(ctx.suggestion.unwrap().contains("missing.cfg"));
    }

    #[test]
    fn test_user_friendly_generic_error_keeps_chain() {
        let error = anyhow::anyhow!("inner").context("outer");
        let ctx = user_friendly_error(error);
        assert!(matches!(ctx.error, PinpackError::Other { .. }));
        assert_eq!(ctx.details.as_deref(), Some("outer: inner"));
    }

    #[test]
    fn test_tool_failure_shows_tool_output() {
        let error = anyhow::Error::from(PinpackError::ToolCommandFailed {
            tool: "fpm".to_string(),
            code: Some(1),
            stderr: "Failed to fetch puka\n".to_string(),
        })
        .context("Failed to package app");
        let ctx = user_friendly_error(error);
        assert_eq!(ctx.details.as_deref(), Some("Failed to fetch puka"));
    }

    #[test]
    fn test_user_friendly_tool_not_found_in_chain() {
        let error = anyhow::Error::from(PinpackError::ToolNotFound {
            tool: "dpkg".to_string(),
        })
        .context("Preparing deb builder");
        let ctx = user_friendly_error(error);
        assert!(matches!(ctx.error, PinpackError::ToolNotFound { .. }));
    }
}

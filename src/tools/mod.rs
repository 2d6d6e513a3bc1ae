//! External tool discovery and execution.

pub mod command_builder;

pub use command_builder::{ToolCommand, ToolOutput};

use std::path::PathBuf;

use crate::core::PinpackError;

/// Resolve a configured tool (bare name or path) to an executable path.
///
/// # Errors
///
/// [`PinpackError::ToolNotFound`] if nothing executable matches.
pub fn locate(tool: &str) -> Result<PathBuf, PinpackError> {
    which::which(tool).map_err(|_| PinpackError::ToolNotFound {
        tool: tool.to_string(),
    })
}

//! Evaluating `setup.py` files whose requirements are computed at runtime.
//!
//! The descriptor runs in a child interpreter with `setup()` replaced by a function
//! that records its keyword arguments. The child runs inside the descriptor's
//! directory so relative reads (`open("requirements.txt")`) work; pinpack's own
//! working directory is untouched.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::tools::ToolCommand;

/// Script handed to the interpreter with `-c`.
const READ_SETUP_SCRIPT: &str = include_str!("../../files/read_setup.py");

/// Line prefix the script prints before the JSON list of requirements.
const MARKER: &str = "__PINPACK_REQUIRES__";

/// Run `setup_py` through `python` and return the raw `install_requires` strings.
///
/// Best effort: evaluation failures are logged and yield an empty list.
pub async fn evaluate_setup_py(python: &Path, setup_py: &Path) -> Vec<String> {
    let (dir, file_name) = split_descriptor_path(setup_py);

    let result = ToolCommand::new(python)
        .arg("-c")
        .arg(READ_SETUP_SCRIPT)
        .arg(file_name)
        .current_dir(&dir)
        .env("PYTHONDONTWRITEBYTECODE", "1")
        .with_context(setup_py.display().to_string())
        .execute()
        .await;

    match result {
        Ok(output) => match parse_marker_output(&output.stdout) {
            Some(requires) => requires,
            None => {
                warn!("Could not read install_requires from {}", setup_py.display());
                Vec::new()
            }
        },
        Err(e) => {
            warn!("Evaluating {} failed: {:#}", setup_py.display(), e);
            Vec::new()
        }
    }
}

fn split_descriptor_path(setup_py: &Path) -> (PathBuf, String) {
    let dir = match setup_py.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = setup_py
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "setup.py".to_string());
    (dir, file_name)
}

/// Find the marker line in the child's stdout and decode its payload.
///
/// The descriptor may print anything it likes; only the last marker line counts.
fn parse_marker_output(stdout: &str) -> Option<Vec<String>> {
    let payload = stdout.lines().rev().find_map(|line| line.trim().strip_prefix(MARKER))?;
    match serde_json::from_str::<Vec<String>>(payload) {
        Ok(requires) => Some(requires),
        Err(e) => {
            debug!("Malformed requirements payload {payload:?}: {e}");
            None
        }
    }
}

//! Removal of stale artifacts before a build.
//!
//! Only files directly inside the working directory whose extension matches the
//! target format are removed. A file that cannot be removed aborts the build so
//! stale and fresh artifacts never end up side by side.

use std::path::Path;

use tracing::debug;

use crate::core::PinpackError;

/// Remove every `*.<extension>` file directly under `working_dir`.
///
/// Returns the names of the removed files, sorted. Running it on a clean directory
/// removes nothing.
///
/// # Errors
///
/// [`PinpackError::CleanupFailed`] if the directory cannot be listed, a matching
/// entry is a directory, or a matching file cannot be removed.
pub fn clean(working_dir: &Path, extension: &str) -> Result<Vec<String>, PinpackError> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&working_dir.to_string_lossy()),
        glob::Pattern::escape(extension)
    );

    let entries = glob::glob(&pattern).map_err(|e| PinpackError::CleanupFailed {
        path: working_dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut removed = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PinpackError::CleanupFailed {
            path: e.path().display().to_string(),
            reason: e.error().to_string(),
        })?;
        // A directory named like an artifact cannot be cleaned without recursing
        let is_dir = std::fs::symlink_metadata(&path).is_ok_and(|meta| meta.is_dir());
        if is_dir {
            return Err(PinpackError::CleanupFailed {
                path: path.display().to_string(),
                reason: "is a directory, not a package file".to_string(),
            });
        }

        std::fs::remove_file(&path).map_err(|e| PinpackError::CleanupFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if let Some(name) = path.file_name() {
            removed.push(name.to_string_lossy().into_owned());
        }
    }

    removed.sort();
    debug!("Deleted old packages: {:?}", removed);
    Ok(removed)
}

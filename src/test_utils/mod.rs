//! Test utilities for pinpack
//!
//! Helpers shared by the unit tests and the integration suite:
//! - [`init_test_logging`] - opt-in tracing output for tests
//! - [`write_fake_tool`] - executable shell scripts standing in for fpm, dpkg or python
//!
//! # Example
//!
//! ```rust,ignore
//! use pinpack_cli::test_utils::{init_test_logging, write_fake_tool};
//!
//! init_test_logging(None);
//! let temp = tempfile::TempDir::new().unwrap();
//! let fpm = write_fake_tool(&temp.path().join("fpm"), "echo ':path=>\"a.deb\"'").unwrap();
//! ```

use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set, that level is used;
/// otherwise logging is enabled only when `RUST_LOG` is set.
///
/// To enable logging in tests via environment variable:
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer() // Important: uses test-compatible writer
            .with_target(true) // Show targets like "tool"
            .with_thread_ids(false)
            .try_init();
    });
}

/// Write an executable `/bin/sh` script with `body` to `path`.
pub fn write_fake_tool(path: &Path, body: &str) -> std::io::Result<PathBuf> {
    std::fs::write(path, format!("#!/bin/sh\n{body}\n"))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(path.to_path_buf())
}

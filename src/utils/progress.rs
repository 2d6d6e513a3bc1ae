//! Progress indicators for long-running builds.
//!
//! A spinner shows which package is being built. It draws to stderr, so it never
//! mixes with command output on stdout, and it is hidden entirely when:
//!
//! - `--no-progress` is passed
//! - the `PINPACK_NO_PROGRESS` environment variable is set
//! - stderr is not a terminal (indicatif skips drawing)
//!
//! # Examples
//!
//! ```rust
//! use pinpack_cli::utils::progress::ProgressBar;
//!
//! let spinner = ProgressBar::new_spinner();
//! spinner.set_message("Building python-puka");
//! // build...
//! spinner.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// Environment variable that disables all progress output.
pub const NO_PROGRESS_ENV: &str = "PINPACK_NO_PROGRESS";

fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// Spinner with pinpack styling.
///
/// Cheap to clone; clones drive the same spinner.
#[derive(Clone, Debug)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Creates a spinner, hidden when progress is disabled via the environment.
    ///
    /// The spinner ticks every 100ms on its own.
    pub fn new_spinner() -> Self {
        if is_progress_disabled() {
            return Self::hidden();
        }
        let bar = IndicatifBar::new_spinner();
        bar.set_style(spinner_style());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            inner: bar,
        }
    }

    /// A spinner that ignores every update.
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    /// Spinner for `enabled`, hidden otherwise.
    pub fn for_flag(enabled: bool) -> Self {
        if enabled { Self::new_spinner() } else { Self::hidden() }
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}

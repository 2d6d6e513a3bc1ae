//! Terminal user interface helpers.
//!
//! - [`progress`] - the build spinner

pub mod progress;

pub use progress::ProgressBar;

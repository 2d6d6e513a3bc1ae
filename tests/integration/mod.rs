//! Integration test suite for pinpack
//!
//! These tests drive the `pinpack` binary end to end against shell-script fakes
//! of `fpm` and `dpkg` (see `tests/common`).
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **recursive**: Recursive dependency builds, cycles and failures
//! - **project**: Packaging the project itself (flags, iteration, pass-through)
//! - **filter**: `--include` behavior
//! - **cleaning**: Stale artifact removal
//! - **error_scenarios**: Fatal configuration errors and exit codes
//! - **cli**: Help, dry runs and `set-version`

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cleaning;
mod cli;
mod error_scenarios;
mod filter;
mod project;
mod recursive;

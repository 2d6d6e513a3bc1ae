//! pinpack - version-pinning package builder
//!
//! pinpack turns a Python project and everything it depends on into OS packages
//! (or wheels) whose dependency declarations carry the versions pinned in a
//! buildout-style versions file. A release pipeline runs it as a plugin step
//! after the version has been decided.
//!
//! # Architecture Overview
//!
//! A build run goes through these stages:
//! - Remove stale artifacts of the target format from the project directory
//! - Read the project's direct dependencies from its descriptor (`setup.py`,
//!   `setup.cfg` or `pyproject.toml`)
//! - Pin every dependency against the `[versions]` section of the versions file
//! - Package each pinned dependency from the package index, read the dependencies
//!   back out of the produced artifact and repeat until nothing new turns up
//! - Package the project itself with tool dependency inference disabled and one
//!   explicit `-d "<os-package> >= <version>"` declaration per direct dependency
//!
//! ## Key Properties
//!
//! - **Once per package**: every package reaches the packaging tool at most once
//!   per run, so dependency cycles terminate
//! - **Per-package failures**: a dependency that cannot be built is reported and
//!   the run carries on
//! - **Deterministic commands**: the same inputs produce the same command lines
//!
//! # Core Modules
//!
//! ## Build pipeline
//! - [`builder`] - The build facade, the recursive dependency builder and the run report
//! - [`cleaner`] - Stale artifact removal
//! - [`descriptor`] - Reading declared dependencies from project descriptors
//! - [`pinning`] - Pinned dependency sets, pin strategies and the include filter
//! - [`packaging`] - Packaging command lines and the deb/rpm/wheel builders
//!
//! ## Naming and configuration
//! - [`naming`] - Package name normalization and the broken-name scheme table
//! - [`versions`] - The versions table loaded from INI files
//! - [`config`] - `pinpack.toml` packaging metadata and tool locations
//!
//! ## Supporting modules
//! - [`cli`] - Command-line interface
//! - [`core`] - Error types and user-facing error reporting
//! - [`tools`] - External tool discovery and execution
//! - [`utils`] - Progress display
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Build release 1.2.0 with the pins from ./versions.cfg
//! pinpack build --package-version 1.2.0
//!
//! # Hotfix iteration, only rebuild the vdt.* dependencies
//! pinpack build --package-version 1.2.0 -- --iteration 2 -i '^vdt'
//!
//! # Show the project's fpm command line
//! pinpack build --package-version 1.2.0 --dry-run
//! ```

// Build pipeline
pub mod builder;
pub mod cleaner;
pub mod descriptor;
pub mod packaging;
pub mod pinning;

// Naming and configuration
pub mod config;
pub mod naming;
pub mod versions;

// Supporting modules
pub mod cli;
pub mod core;
pub mod tools;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

//! Core types shared by every pinpack module.
//!
//! At the moment this is the error system: [`PinpackError`] for typed failures and
//! [`ErrorContext`] / [`user_friendly_error`] for CLI presentation.

pub mod error;

pub use error::{ErrorContext, PinpackError, user_friendly_error};

//! Validation-and-execution core of the inven agent.
//!
//! One collection cycle flows through three stages:
//!
//! 1. [`validator::validate_gatherers`] reconciles the operator [`Policy`]
//!    against the supported and installed capability sets, producing the
//!    [`validator::ValidatedMapping`] of gatherers cleared for execution.
//! 2. [`runner::GathererRunner`] executes the mapping with per-gatherer
//!    failure isolation and merges all successfully produced items.
//! 3. [`guard::SizeGuard`] gates each item into the upload batch so the
//!    cumulative payload never exceeds the backend's size ceiling.
//!
//! Validation and execution errors are aggregates returned *alongside*
//! partial results; callers must not discard the partial output merely
//! because an error is present.
//!
//! [`Policy`]: inven_common::types::Policy

pub mod error;
pub mod guard;
pub mod runner;
pub mod validator;

#[cfg(test)]
mod tests;

pub use error::{ExecutionError, GathererError, ValidationError};
pub use guard::{SizeGuard, DEFAULT_UPLOAD_CEILING_BYTES};
pub use runner::GathererRunner;
pub use validator::{validate_gatherers, ValidatedMapping};

//! Shared data model for the inven host inventory agent.
//!
//! These types flow between the policy loader, the validation-and-execution
//! core, the gatherer implementations, and the uploader.

pub mod types;

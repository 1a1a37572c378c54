//! Inventory gatherer framework for the inven agent.
//!
//! Each [`Gatherer`] implementation captures one category of host inventory
//! (operating system, network, storage, applications, custom documents) and
//! returns it as a vector of [`Item`]s ready for upload. Gatherers are
//! registered by name in a [`registry::CapabilitySet`]; which of them
//! actually run in a cycle is decided by the validation core.

pub mod application;
pub mod context;
pub mod custom;
pub mod network;
pub mod os;
pub mod registry;
pub mod storage;


use anyhow::Result;
use async_trait::async_trait;
use inven_common::types::{GathererConfig, Item};

pub use context::{CancelHandle, ExecutionContext};
pub use registry::CapabilitySet;

/// A host inventory gatherer.
///
/// Implementations are registered in the capability sets at process start
/// and invoked once per collection cycle with the operator-supplied config
/// for their name. The trait requires `Send + Sync` so the runner can
/// execute gatherers concurrently.
#[async_trait]
pub trait Gatherer: Send + Sync {
    /// Returns the gatherer name (e.g., `"os"`, `"network"`), the key under
    /// which it appears in capability sets and policy documents.
    fn name(&self) -> &str;

    /// Captures this gatherer's inventory category.
    ///
    /// The execution context is passed through unmodified; long-running
    /// gatherers may poll [`ExecutionContext::is_cancelled`] to return
    /// early.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying data source cannot be read. A
    /// failure here never aborts the collection cycle; the runner records
    /// it and keeps going.
    async fn run(&self, ctx: &ExecutionContext, config: &GathererConfig) -> Result<Vec<Item>>;
}

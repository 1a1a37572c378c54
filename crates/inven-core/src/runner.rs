use crate::error::{ExecutionError, GathererError};
use crate::validator::ValidatedMapping;
use inven_common::types::Item;
use inven_gatherer::ExecutionContext;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Executes a [`ValidatedMapping`] with per-gatherer failure isolation.
///
/// Each gatherer runs in its own task, bounded by a semaphore; results are
/// merged at the single join point, so no accumulator is shared between
/// writers. A failing, cancelled, or panicking gatherer never prevents the
/// others from running, and their items survive in the partial output.
pub struct GathererRunner {
    max_concurrent: usize,
}

impl GathererRunner {
    /// `max_concurrent` bounds how many gatherers run at once; `0` means
    /// one task per validated gatherer.
    pub fn new(max_concurrent: usize) -> Self {
        Self { max_concurrent }
    }

    /// Runs every entry of the mapping and concatenates the items of the
    /// successful gatherers.
    ///
    /// Items from a single gatherer keep that gatherer's return order;
    /// ordering across gatherers follows task order. If any gatherer fails,
    /// the accumulated items are returned together with an
    /// [`ExecutionError`] enumerating every failure.
    pub async fn run(
        &self,
        ctx: &ExecutionContext,
        mapping: &ValidatedMapping,
    ) -> (Vec<Item>, Option<ExecutionError>) {
        if mapping.is_empty() {
            return (Vec::new(), None);
        }

        let permits = if self.max_concurrent == 0 {
            mapping.len()
        } else {
            self.max_concurrent
        };
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut tasks = Vec::with_capacity(mapping.len());

        for (gatherer, config) in mapping.iter() {
            let gatherer = Arc::clone(gatherer);
            let config = config.clone();
            let ctx = ctx.clone();
            let semaphore = Arc::clone(&semaphore);
            let name = gatherer.name().to_string();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore never closed");
                tokio::select! {
                    _ = ctx.cancelled() => Err(GathererError::Cancelled),
                    result = gatherer.run(&ctx, &config) => result.map_err(GathererError::from),
                }
            });
            tasks.push((name, handle));
        }

        let mut items = Vec::new();
        let mut failures = Vec::new();
        for (name, handle) in tasks {
            match handle.await {
                Ok(Ok(mut produced)) => {
                    tracing::debug!(gatherer = %name, count = produced.len(), "Gatherer finished");
                    items.append(&mut produced);
                }
                Ok(Err(e)) => {
                    tracing::warn!(gatherer = %name, error = %e, "Gatherer failed");
                    failures.push((name, e));
                }
                Err(e) => {
                    tracing::error!(gatherer = %name, error = %e, "Gatherer task panicked");
                    failures.push((name, GathererError::Panicked(e.to_string())));
                }
            }
        }

        let error = if failures.is_empty() {
            None
        } else {
            Some(ExecutionError { failures })
        };
        (items, error)
    }
}

impl Default for GathererRunner {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Why a single gatherer produced no items.
///
/// `Cancelled` is distinguishable from an ordinary failure so callers can
/// tell an operator-initiated shutdown apart from a broken gatherer.
#[derive(Debug, thiserror::Error)]
pub enum GathererError {
    /// The gatherer itself returned an error.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),

    /// The collection cycle was cancelled before the gatherer finished.
    #[error("collection cycle cancelled before the gatherer finished")]
    Cancelled,

    /// The gatherer task panicked; the panic is contained to that gatherer.
    #[error("gatherer task panicked: {0}")]
    Panicked(String),
}

/// One or more policy-enabled gatherers are supported by this build but not
/// installed on this host.
///
/// Non-fatal: the validator returns it alongside the still-usable partial
/// mapping. Unsupported gatherer names never appear here.
#[derive(Debug, thiserror::Error)]
#[error("gatherers enabled by policy are supported but not installed: {}", .missing.join(", "))]
pub struct ValidationError {
    /// Names of every affected gatherer, sorted.
    pub missing: Vec<String>,
}

/// One or more gatherers failed during the run.
///
/// Non-fatal: the runner returns it alongside the items collected by the
/// gatherers that succeeded.
#[derive(Debug, thiserror::Error)]
#[error("{} gatherer(s) failed: {}", .failures.len(), format_failures(.failures))]
pub struct ExecutionError {
    /// `(gatherer name, cause)` for every failure, in task order.
    pub failures: Vec<(String, GathererError)>,
}

fn format_failures(failures: &[(String, GathererError)]) -> String {
    failures
        .iter()
        .map(|(name, cause)| format!("{name}: {cause}"))
        .collect::<Vec<_>>()
        .join("; ")
}

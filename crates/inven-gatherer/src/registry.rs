use crate::application::{ApplicationGatherer, PackageBackend};
use crate::custom::CustomGatherer;
use crate::network::NetworkGatherer;
use crate::os::OsGatherer;
use crate::storage::StorageGatherer;
use crate::Gatherer;
use std::collections::HashMap;
use std::sync::Arc;

/// An immutable mapping from gatherer name to its handle.
///
/// Two instances exist per collection cycle: the *supported* set (every
/// gatherer compiled into this build) and the *installed* set (those that
/// actually initialized on this host). Their key sets are independent and
/// may diverge; reconciling them against the policy is the validator's job.
///
/// # Examples
///
/// ```
/// use inven_gatherer::registry;
///
/// let supported = registry::supported_set();
/// assert!(supported.contains("os"));
/// assert!(supported.contains("network"));
/// assert!(!supported.contains("nonexistent"));
/// ```
pub struct CapabilitySet {
    gatherers: HashMap<String, Arc<dyn Gatherer>>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self {
            gatherers: HashMap::new(),
        }
    }

    /// Registers a gatherer under its own name. A later registration with
    /// the same name replaces the earlier one.
    pub fn register(&mut self, gatherer: Arc<dyn Gatherer>) {
        let name = gatherer.name().to_string();
        self.gatherers.insert(name, gatherer);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Gatherer>> {
        self.gatherers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.gatherers.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.gatherers.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.gatherers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gatherers.is_empty()
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::new()
    }
}

/// Every gatherer name known to this build.
///
/// Handles in the supported set are only consulted for name membership;
/// the validator always hands the runner the handle from the installed set.
pub fn supported_set() -> CapabilitySet {
    let mut set = CapabilitySet::new();
    set.register(Arc::new(OsGatherer::new()));
    set.register(Arc::new(NetworkGatherer::new()));
    set.register(Arc::new(StorageGatherer::new()));
    set.register(Arc::new(ApplicationGatherer::with_backend(
        PackageBackend::Dpkg,
    )));
    set.register(Arc::new(CustomGatherer::new()));
    set
}

/// The gatherers that actually initialized on this host.
///
/// Each supported gatherer is probed once; a failed probe keeps it out of
/// the installed set (and thus reportable by validation as
/// supported-but-not-installed) without failing agent startup.
pub fn installed_set() -> CapabilitySet {
    let mut set = CapabilitySet::new();
    set.register(Arc::new(OsGatherer::new()));
    set.register(Arc::new(NetworkGatherer::new()));
    set.register(Arc::new(StorageGatherer::new()));
    match ApplicationGatherer::detect() {
        Ok(gatherer) => set.register(Arc::new(gatherer)),
        Err(e) => {
            tracing::warn!(gatherer = "application", error = %e, "Gatherer not installed on this host");
        }
    }
    set.register(Arc::new(CustomGatherer::new()));
    set
}

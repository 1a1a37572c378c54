use crate::error::ValidationError;
use inven_common::types::{CollectionState, GathererConfig, Policy};
use inven_gatherer::{CapabilitySet, Gatherer};
use std::sync::Arc;

/// The gatherers cleared for execution in one collection cycle, each paired
/// with its policy config.
///
/// Only [`validate_gatherers`] constructs this type, so the runner can only
/// ever see gatherers that are enabled by policy, supported by the build,
/// and installed on the host.
#[derive(Default)]
pub struct ValidatedMapping {
    entries: Vec<(Arc<dyn Gatherer>, GathererConfig)>,
}

impl ValidatedMapping {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Arc<dyn Gatherer>, &GathererConfig)> {
        self.entries.iter().map(|(g, c)| (g, c))
    }

    /// Gatherer names in the mapping, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.iter().map(|(g, _)| g.name()).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ValidatedMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedMapping")
            .field("gatherers", &self.names())
            .finish()
    }
}

/// Reconciles the operator policy against the supported and installed
/// capability sets.
///
/// For every policy entry with collection enabled:
/// - a name unknown to this build is skipped silently (policies are allowed
///   to target newer or older agent builds);
/// - a name supported by the build but missing from the installed set is
///   recorded in the returned [`ValidationError`];
/// - otherwise the installed handle is paired with the policy config.
///
/// The partial mapping is always returned, even when the error is present.
pub fn validate_gatherers(
    policy: &Policy,
    supported: &CapabilitySet,
    installed: &CapabilitySet,
) -> (ValidatedMapping, Option<ValidationError>) {
    let mut mapping = ValidatedMapping::default();
    let mut missing = Vec::new();

    for (name, config) in &policy.gatherers {
        if config.collection != CollectionState::Enabled {
            continue;
        }
        if !supported.contains(name) {
            tracing::debug!(
                gatherer = %name,
                "Policy enables a gatherer unknown to this build, skipping"
            );
            continue;
        }
        match installed.get(name) {
            Some(handle) => mapping.entries.push((handle, config.clone())),
            None => missing.push(name.clone()),
        }
    }

    // Policy is a map, so iteration order is arbitrary; keep diagnostics stable.
    missing.sort_unstable();

    let error = if missing.is_empty() {
        None
    } else {
        Some(ValidationError { missing })
    };
    (mapping, error)
}

use crate::error::GathererError;
use crate::guard::SizeGuard;
use crate::runner::GathererRunner;
use crate::validator::validate_gatherers;
use async_trait::async_trait;
use chrono::Utc;
use inven_common::types::{CollectionState, GathererConfig, Item, Policy};
use inven_gatherer::{CapabilitySet, ExecutionContext, Gatherer};
use std::sync::Arc;
use std::time::Duration;

struct MockGatherer {
    name: String,
    items: Vec<Item>,
    fail: bool,
    panics: bool,
    delay: Duration,
}

impl MockGatherer {
    fn returning(name: &str, items: Vec<Item>) -> Arc<dyn Gatherer> {
        Arc::new(Self {
            name: name.to_string(),
            items,
            fail: false,
            panics: false,
            delay: Duration::ZERO,
        })
    }

    fn failing(name: &str) -> Arc<dyn Gatherer> {
        Arc::new(Self {
            name: name.to_string(),
            items: Vec::new(),
            fail: true,
            panics: false,
            delay: Duration::ZERO,
        })
    }

    fn panicking(name: &str) -> Arc<dyn Gatherer> {
        Arc::new(Self {
            name: name.to_string(),
            items: Vec::new(),
            fail: false,
            panics: true,
            delay: Duration::ZERO,
        })
    }

    fn slow(name: &str, delay: Duration) -> Arc<dyn Gatherer> {
        Arc::new(Self {
            name: name.to_string(),
            items: vec![mock_item("Fake:Slow", "late")],
            fail: false,
            panics: false,
            delay,
        })
    }
}

#[async_trait]
impl Gatherer for MockGatherer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        _ctx: &ExecutionContext,
        _config: &GathererConfig,
    ) -> anyhow::Result<Vec<Item>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.panics {
            panic!("synthetic panic in {}", self.name);
        }
        if self.fail {
            anyhow::bail!("synthetic failure in {}", self.name);
        }
        Ok(self.items.clone())
    }
}

fn mock_item(name: &str, content: &str) -> Item {
    Item {
        name: name.to_string(),
        schema_version: "1.0".to_string(),
        content: content.to_string(),
        captured_at: Utc::now(),
    }
}

fn item_of_size(bytes: usize) -> Item {
    mock_item("Fake:Large", &"x".repeat(bytes))
}

fn capability_set(gatherers: Vec<Arc<dyn Gatherer>>) -> CapabilitySet {
    let mut set = CapabilitySet::new();
    for gatherer in gatherers {
        set.register(gatherer);
    }
    set
}

fn named_set(names: &[&str]) -> CapabilitySet {
    capability_set(
        names
            .iter()
            .map(|n| MockGatherer::returning(n, vec![mock_item("Fake:Name", "Fake:Content")]))
            .collect(),
    )
}

fn enabled_policy(names: &[&str]) -> Policy {
    let mut policy = Policy::default();
    for name in names {
        policy
            .gatherers
            .insert(name.to_string(), GathererConfig::enabled());
    }
    policy
}

fn test_context() -> ExecutionContext {
    ExecutionContext::new("test-agent").0
}

// ── Validator ──

#[test]
fn validate_accepts_supported_installed_gatherer() {
    let supported = named_set(&["a", "b"]);
    let installed = named_set(&["a", "b"]);
    let (mapping, error) = validate_gatherers(&enabled_policy(&["a"]), &supported, &installed);
    assert!(error.is_none());
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.names(), vec!["a"]);
}

#[test]
fn validate_accepts_multiple_gatherers() {
    let supported = named_set(&["a", "b"]);
    let installed = named_set(&["a", "b"]);
    let (mapping, error) = validate_gatherers(&enabled_policy(&["a", "b"]), &supported, &installed);
    assert!(error.is_none());
    assert_eq!(mapping.len(), 2);
}

#[test]
fn validate_skips_unsupported_gatherer_silently() {
    let supported = named_set(&["a", "b"]);
    let installed = named_set(&["a", "b"]);
    let (mapping, error) =
        validate_gatherers(&enabled_policy(&["unknown"]), &supported, &installed);
    assert!(error.is_none(), "unsupported names must never be an error");
    assert_eq!(mapping.len(), 0);
}

#[test]
fn validate_reports_supported_but_not_installed() {
    let supported = named_set(&["a"]);
    let installed = named_set(&["b"]);
    let (mapping, error) = validate_gatherers(&enabled_policy(&["a"]), &supported, &installed);
    assert_eq!(mapping.len(), 0);
    let error = error.expect("uninstalled gatherer must be reported");
    assert_eq!(error.missing, vec!["a".to_string()]);
    assert!(error.to_string().contains("a"));
}

#[test]
fn validate_returns_partial_mapping_alongside_error() {
    let supported = named_set(&["a", "b", "uninstalled"]);
    let installed = named_set(&["a", "b"]);
    let policy = enabled_policy(&["a", "b", "uninstalled", "unknown"]);
    let (mapping, error) = validate_gatherers(&policy, &supported, &installed);
    assert_eq!(mapping.names(), vec!["a", "b"]);
    let error = error.expect("uninstalled gatherer must be reported");
    assert_eq!(error.missing, vec!["uninstalled".to_string()]);
    assert!(!error.to_string().contains("unknown"));
}

#[test]
fn validate_skips_disabled_entries() {
    let supported = named_set(&["a", "b"]);
    let installed = named_set(&["a", "b"]);
    let mut policy = enabled_policy(&["a"]);
    policy.gatherers.insert(
        "b".to_string(),
        GathererConfig {
            collection: CollectionState::Disabled,
            ..GathererConfig::default()
        },
    );
    let (mapping, error) = validate_gatherers(&policy, &supported, &installed);
    assert!(error.is_none());
    assert_eq!(mapping.names(), vec!["a"]);
}

#[test]
fn validate_is_idempotent() {
    let supported = named_set(&["a", "b", "c"]);
    let installed = named_set(&["a", "c"]);
    let policy = enabled_policy(&["a", "b", "c"]);
    let (first, first_err) = validate_gatherers(&policy, &supported, &installed);
    let (second, second_err) = validate_gatherers(&policy, &supported, &installed);
    assert_eq!(first.names(), second.names());
    assert_eq!(
        first_err.map(|e| e.missing),
        second_err.map(|e| e.missing)
    );
}

// ── Runner ──

#[tokio::test]
async fn runner_merges_items_from_all_gatherers() {
    let gatherers: Vec<Arc<dyn Gatherer>> = vec![
        MockGatherer::returning(
            "one",
            vec![mock_item("Fake:A", "1"), mock_item("Fake:B", "2")],
        ),
        MockGatherer::returning("two", vec![mock_item("Fake:C", "3")]),
    ];
    let set = capability_set(gatherers);
    let (mapping, _) = validate_gatherers(&enabled_policy(&["one", "two"]), &set, &set);

    let (items, error) = GathererRunner::default().run(&test_context(), &mapping).await;
    assert!(error.is_none());
    assert_eq!(items.len(), 3);
}

#[tokio::test]
async fn runner_isolates_a_failing_gatherer() {
    let gatherers: Vec<Arc<dyn Gatherer>> = vec![
        MockGatherer::returning("healthy", vec![mock_item("Fake:Name", "Fake:Content")]),
        MockGatherer::failing("broken"),
    ];
    let set = capability_set(gatherers);
    let (mapping, _) = validate_gatherers(&enabled_policy(&["healthy", "broken"]), &set, &set);

    let (items, error) = GathererRunner::default().run(&test_context(), &mapping).await;
    assert_eq!(items.len(), 1, "healthy gatherer's items must survive");

    let error = error.expect("failing gatherer must be reported");
    assert_eq!(error.failures.len(), 1);
    assert_eq!(error.failures[0].0, "broken");
    assert!(matches!(error.failures[0].1, GathererError::Failed(_)));
    assert!(error.to_string().contains("broken"));
}

#[tokio::test]
async fn runner_isolates_a_panicking_gatherer() {
    let gatherers: Vec<Arc<dyn Gatherer>> = vec![
        MockGatherer::returning("healthy", vec![mock_item("Fake:Name", "Fake:Content")]),
        MockGatherer::panicking("crashy"),
    ];
    let set = capability_set(gatherers);
    let (mapping, _) = validate_gatherers(&enabled_policy(&["healthy", "crashy"]), &set, &set);

    let (items, error) = GathererRunner::default().run(&test_context(), &mapping).await;
    assert_eq!(items.len(), 1, "healthy gatherer's items must survive");

    let error = error.expect("panicking gatherer must be reported");
    assert_eq!(error.failures.len(), 1);
    assert_eq!(error.failures[0].0, "crashy");
    assert!(matches!(error.failures[0].1, GathererError::Panicked(_)));
}

#[tokio::test]
async fn runner_preserves_single_gatherer_item_order() {
    let items = vec![
        mock_item("Fake:First", "1"),
        mock_item("Fake:Second", "2"),
        mock_item("Fake:Third", "3"),
    ];
    let set = capability_set(vec![MockGatherer::returning("ordered", items.clone())]);
    let (mapping, _) = validate_gatherers(&enabled_policy(&["ordered"]), &set, &set);

    let (collected, error) = GathererRunner::default().run(&test_context(), &mapping).await;
    assert!(error.is_none());
    assert_eq!(collected, items);
}

#[tokio::test]
async fn runner_with_empty_mapping_returns_nothing() {
    let set = named_set(&["a"]);
    let (mapping, _) = validate_gatherers(&Policy::default(), &set, &set);
    let (items, error) = GathererRunner::default().run(&test_context(), &mapping).await;
    assert!(items.is_empty());
    assert!(error.is_none());
}

#[tokio::test]
async fn runner_respects_concurrency_bound() {
    let gatherers: Vec<Arc<dyn Gatherer>> = (0..4)
        .map(|i| MockGatherer::returning(&format!("g{i}"), vec![mock_item("Fake:Name", "x")]))
        .collect();
    let set = capability_set(gatherers);
    let (mapping, _) = validate_gatherers(&enabled_policy(&["g0", "g1", "g2", "g3"]), &set, &set);

    let (items, error) = GathererRunner::new(1).run(&test_context(), &mapping).await;
    assert!(error.is_none());
    assert_eq!(items.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn runner_cancellation_keeps_completed_results() {
    let gatherers: Vec<Arc<dyn Gatherer>> = vec![
        MockGatherer::returning("fast", vec![mock_item("Fake:Fast", "done")]),
        MockGatherer::slow("stuck", Duration::from_secs(3600)),
    ];
    let set = capability_set(gatherers);
    let (mapping, _) = validate_gatherers(&enabled_policy(&["fast", "stuck"]), &set, &set);

    let (ctx, cancel) = ExecutionContext::new("test-agent");
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let (items, error) = GathererRunner::default().run(&ctx, &mapping).await;

    assert_eq!(items.len(), 1, "fast gatherer's items remain valid");
    assert_eq!(items[0].name, "Fake:Fast");

    let error = error.expect("cancelled gatherer must be reported");
    assert_eq!(error.failures.len(), 1);
    assert_eq!(error.failures[0].0, "stuck");
    assert!(matches!(error.failures[0].1, GathererError::Cancelled));
}

// ── Size guard ──

#[test]
fn guard_small_batch_is_within_limit() {
    let guard = SizeGuard::default();
    let accepted = vec![mock_item("Fake:Name", "Fake:Content")];
    let candidate = mock_item("Fake:Name", "Fake:Content");
    assert!(guard.within_limit(&candidate, &accepted));
}

#[test]
fn guard_rejects_when_accumulated_total_exceeds_ceiling() {
    let guard = SizeGuard::default();
    let accepted = vec![
        mock_item("Fake:Name", "Fake:Content"),
        item_of_size(1024 * 1024),
    ];
    let candidate = mock_item("Fake:Name", "Fake:Content");
    assert!(!guard.within_limit(&candidate, &accepted));
}

#[test]
fn guard_boundary_is_inclusive() {
    let ceiling = 1024 * 1024;
    let guard = SizeGuard::new(ceiling - 1);
    assert!(
        !guard.within_limit(&item_of_size(ceiling), &[]),
        "one byte over the ceiling must be rejected"
    );

    let guard = SizeGuard::new(ceiling);
    let accepted = vec![item_of_size(100)];
    assert!(
        guard.within_limit(&item_of_size(ceiling - 100), &accepted),
        "exactly reaching the ceiling must be accepted"
    );
    assert!(!guard.within_limit(&item_of_size(ceiling - 99), &accepted));
}

#[test]
fn guard_does_not_mutate_accepted_items() {
    let guard = SizeGuard::new(8);
    let accepted = vec![item_of_size(4)];
    let before = accepted.clone();
    let _ = guard.within_limit(&item_of_size(100), &accepted);
    assert_eq!(accepted, before);
}

mod config;
mod uploader;

use anyhow::{Context, Result};
use inven_common::types::{Item, Policy};
use inven_core::{validate_gatherers, GathererRunner, SizeGuard};
use inven_gatherer::{registry, ExecutionContext};
use tokio::signal;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use uploader::{HttpUploader, Uploader};

fn load_policy(path: &str) -> Result<Policy> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read policy document {path}"))?;
    let policy: Policy =
        serde_json::from_str(&content).with_context(|| format!("malformed policy document {path}"))?;
    Ok(policy)
}

/// Fills in the custom gatherer's document directory when the policy
/// enables it without a `location`. A location set in the policy always
/// wins over the agent config.
fn apply_custom_inventory_dir(policy: &mut Policy, dir: Option<&str>) {
    let Some(dir) = dir else { return };
    if let Some(config) = policy.gatherers.get_mut("custom") {
        if config.location.is_none() {
            config.location = Some(dir.to_string());
        }
    }
}

/// Incremental admission gate: items are checked against the batch
/// accumulated so far and appended only while the ceiling holds. Oversized
/// items are dropped, never the batch.
fn admit_items(guard: &SizeGuard, items: Vec<Item>) -> (Vec<Item>, Vec<Item>) {
    let mut accepted = Vec::with_capacity(items.len());
    let mut dropped = Vec::new();
    for item in items {
        if guard.within_limit(&item, &accepted) {
            accepted.push(item);
        } else {
            dropped.push(item);
        }
    }
    (accepted, dropped)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/agent.toml".to_string());

    let config = config::AgentConfig::load(&config_path)?;
    tracing::info!(agent_id = %config.agent_id, "inven-agent starting collection cycle");

    let mut policy = load_policy(&config.policy_path)?;
    apply_custom_inventory_dir(&mut policy, config.custom_inventory_dir.as_deref());
    let supported = registry::supported_set();
    let installed = registry::installed_set();

    let (ctx, cancel) = ExecutionContext::new(&config.agent_id);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling collection");
            cancel.cancel();
        }
    });

    let (mapping, validation_error) = validate_gatherers(&policy, &supported, &installed);
    if let Some(e) = &validation_error {
        tracing::warn!(error = %e, "Policy references gatherers missing from this host");
    }
    tracing::info!(count = mapping.len(), "Validated gatherers");

    let runner = GathererRunner::new(config.max_concurrent_gatherers);
    let (items, execution_error) = runner.run(&ctx, &mapping).await;
    if let Some(e) = &execution_error {
        tracing::warn!(error = %e, "Some gatherers failed, uploading partial inventory");
    }
    tracing::info!(count = items.len(), "Collected inventory items");

    let guard = SizeGuard::new(config.upload_ceiling_bytes);
    let (accepted, dropped) = admit_items(&guard, items);
    for item in &dropped {
        tracing::warn!(
            item = %item.name,
            size = item.size_bytes(),
            ceiling = guard.ceiling_bytes(),
            "Item dropped: upload batch would exceed the size ceiling"
        );
    }

    if accepted.is_empty() {
        tracing::info!("Nothing to upload");
        return Ok(());
    }

    let uploader = HttpUploader::new(
        config.endpoint.clone(),
        config.agent_id.clone(),
        config.auth_token.clone(),
    );
    uploader.upload(&accepted).await?;

    Ok(())
}

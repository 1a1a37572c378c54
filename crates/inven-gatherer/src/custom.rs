use crate::{ExecutionContext, Gatherer};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use inven_common::types::{GathererConfig, Item};

pub const SCHEMA_VERSION: &str = "1.0";

/// Collects operator-authored custom inventory documents.
///
/// Reads every `*.json` file from the directory named by the policy's
/// `location` config and emits one `Custom:<basename>` item per document.
/// Files that are not well-formed JSON are skipped with a warning rather
/// than failing the whole gatherer.
pub struct CustomGatherer;

impl CustomGatherer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CustomGatherer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gatherer for CustomGatherer {
    fn name(&self) -> &str {
        "custom"
    }

    async fn run(&self, ctx: &ExecutionContext, config: &GathererConfig) -> Result<Vec<Item>> {
        let Some(location) = config.location.as_deref() else {
            tracing::debug!(
                agent_id = ctx.agent_id(),
                "Custom gatherer enabled without a location, nothing to collect"
            );
            return Ok(Vec::new());
        };

        let mut entries = tokio::fs::read_dir(location)
            .await
            .with_context(|| format!("failed to read custom inventory directory {location}"))?;

        let mut items = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .context("failed to read directory entry")?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;

            if let Err(e) = serde_json::from_str::<serde_json::Value>(&raw) {
                tracing::warn!(
                    file = %path.display(),
                    error = %e,
                    "Skipping malformed custom inventory document"
                );
                continue;
            }

            items.push(Item {
                name: format!("Custom:{stem}"),
                schema_version: SCHEMA_VERSION.to_string(),
                content: raw,
                captured_at: Utc::now(),
            });
        }

        // Directory listing order is platform-dependent.
        items.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(
            agent_id = ctx.agent_id(),
            count = items.len(),
            location,
            "Captured custom inventory"
        );

        Ok(items)
    }
}

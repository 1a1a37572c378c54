use crate::{ExecutionContext, Gatherer};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use inven_common::types::{GathererConfig, Item};
use serde::Serialize;
use sysinfo::Disks;

pub const ITEM_NAME: &str = "Host:Storage";
pub const SCHEMA_VERSION: &str = "1.0";

/// Captures mounted filesystem inventory.
pub struct StorageGatherer;

#[derive(Debug, Serialize)]
struct DiskRecord {
    mount_point: String,
    file_system: String,
    kind: String,
    total_bytes: u64,
    available_bytes: u64,
}

impl StorageGatherer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StorageGatherer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gatherer for StorageGatherer {
    fn name(&self) -> &str {
        "storage"
    }

    async fn run(&self, ctx: &ExecutionContext, _config: &GathererConfig) -> Result<Vec<Item>> {
        let disks = Disks::new_with_refreshed_list();

        let mut records: Vec<DiskRecord> = disks
            .iter()
            .map(|disk| DiskRecord {
                mount_point: disk.mount_point().to_string_lossy().to_string(),
                file_system: disk.file_system().to_string_lossy().to_string(),
                kind: disk.kind().to_string(),
                total_bytes: disk.total_space(),
                available_bytes: disk.available_space(),
            })
            .collect();
        records.sort_by(|a, b| a.mount_point.cmp(&b.mount_point));

        tracing::debug!(
            agent_id = ctx.agent_id(),
            disks = records.len(),
            "Captured storage inventory"
        );

        Ok(vec![Item {
            name: ITEM_NAME.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            content: serde_json::to_string(&records)?,
            captured_at: Utc::now(),
        }])
    }
}

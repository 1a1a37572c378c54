use crate::{ExecutionContext, Gatherer};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use inven_common::types::{GathererConfig, Item};
use serde::Serialize;
use sysinfo::System;

pub const ITEM_NAME: &str = "Host:OperatingSystem";
pub const SCHEMA_VERSION: &str = "1.0";

/// Captures operating system identity and base hardware facts.
pub struct OsGatherer;

#[derive(Debug, Serialize)]
struct OsRecord {
    os_name: String,
    os_version: String,
    kernel_version: String,
    hostname: String,
    cpu_arch: String,
    cpu_cores: usize,
    total_memory_bytes: u64,
}

impl OsGatherer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OsGatherer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gatherer for OsGatherer {
    fn name(&self) -> &str {
        "os"
    }

    async fn run(&self, ctx: &ExecutionContext, _config: &GathererConfig) -> Result<Vec<Item>> {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu_all();

        let record = OsRecord {
            os_name: System::name().unwrap_or_else(|| "unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
            kernel_version: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            cpu_arch: System::cpu_arch().unwrap_or_else(|| "unknown".to_string()),
            cpu_cores: system.cpus().len(),
            total_memory_bytes: system.total_memory(),
        };

        tracing::debug!(agent_id = ctx.agent_id(), hostname = %record.hostname, "Captured OS inventory");

        Ok(vec![Item {
            name: ITEM_NAME.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            content: serde_json::to_string(&record)?,
            captured_at: Utc::now(),
        }])
    }
}

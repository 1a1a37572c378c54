use crate::{ExecutionContext, Gatherer};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use inven_common::types::{GathererConfig, Item};
use serde::Serialize;
use sysinfo::Networks;

pub const ITEM_NAME: &str = "Host:Network";
pub const SCHEMA_VERSION: &str = "1.0";

/// Captures per-interface network inventory.
pub struct NetworkGatherer;

#[derive(Debug, Serialize)]
struct InterfaceRecord {
    interface: String,
    mac_address: String,
    ip_addresses: Vec<String>,
    bytes_received: u64,
    bytes_transmitted: u64,
    packets_received: u64,
    packets_transmitted: u64,
}

impl NetworkGatherer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NetworkGatherer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gatherer for NetworkGatherer {
    fn name(&self) -> &str {
        "network"
    }

    async fn run(&self, ctx: &ExecutionContext, _config: &GathererConfig) -> Result<Vec<Item>> {
        let networks = Networks::new_with_refreshed_list();

        let mut records: Vec<InterfaceRecord> = networks
            .iter()
            .map(|(name, data)| InterfaceRecord {
                interface: name.clone(),
                mac_address: data.mac_address().to_string(),
                ip_addresses: data
                    .ip_networks()
                    .iter()
                    .map(|ip| format!("{}/{}", ip.addr, ip.prefix))
                    .collect(),
                bytes_received: data.total_received(),
                bytes_transmitted: data.total_transmitted(),
                packets_received: data.total_packets_received(),
                packets_transmitted: data.total_packets_transmitted(),
            })
            .collect();
        records.sort_by(|a, b| a.interface.cmp(&b.interface));

        tracing::debug!(
            agent_id = ctx.agent_id(),
            interfaces = records.len(),
            "Captured network inventory"
        );

        Ok(vec![Item {
            name: ITEM_NAME.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            content: serde_json::to_string(&records)?,
            captured_at: Utc::now(),
        }])
    }
}

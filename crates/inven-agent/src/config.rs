use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    pub agent_id: String,
    /// Path to the operator policy document (JSON).
    pub policy_path: String,
    /// Inventory service endpoint the accepted batch is uploaded to.
    pub endpoint: String,
    /// Optional bearer token for the inventory service.
    pub auth_token: Option<String>,
    #[serde(default = "default_upload_ceiling_bytes")]
    pub upload_ceiling_bytes: usize,
    /// Upper bound on gatherers running at once; 0 means one task per
    /// validated gatherer.
    #[serde(default)]
    pub max_concurrent_gatherers: usize,
    /// Directory for custom inventory documents, used when the policy's
    /// custom gatherer entry does not set its own `location`.
    pub custom_inventory_dir: Option<String>,
}

fn default_upload_ceiling_bytes() -> usize {
    inven_core::DEFAULT_UPLOAD_CEILING_BYTES
}

impl AgentConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

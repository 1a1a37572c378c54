use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inven_common::types::Item;
use serde::Serialize;

/// Ships an accepted inventory batch to the backend service.
///
/// Every item in the batch already satisfies the size ceiling; the uploader
/// performs no further validation and no retries.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, items: &[Item]) -> Result<()>;
}

#[derive(Serialize)]
struct UploadBatch<'a> {
    agent_id: &'a str,
    reported_at: DateTime<Utc>,
    items: &'a [Item],
}

/// Uploads batches as JSON over HTTP, with an optional bearer token.
pub struct HttpUploader {
    client: reqwest::Client,
    endpoint: String,
    agent_id: String,
    auth_token: Option<String>,
}

impl HttpUploader {
    pub fn new(endpoint: String, agent_id: String, auth_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            agent_id,
            auth_token,
        }
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, items: &[Item]) -> Result<()> {
        let batch = UploadBatch {
            agent_id: &self.agent_id,
            reported_at: Utc::now(),
            items,
        };

        let mut request = self.client.post(&self.endpoint).json(&batch);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("failed to reach inventory service at {}", self.endpoint))?;
        response
            .error_for_status()
            .context("inventory service rejected the batch")?;

        tracing::info!(count = items.len(), "Inventory batch uploaded");
        Ok(())
    }
}

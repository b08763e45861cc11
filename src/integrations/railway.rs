//! Railway build log retrieval.

use async_trait::async_trait;
use reqwest::Client;

use super::BuildLogs;

/// Fetches build logs from the Railway API.
pub struct RailwayClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RailwayClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn fetch_inner(&self, build_id: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get(format!("{}/builds/{}/logs", self.base_url, build_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl BuildLogs for RailwayClient {
    async fn fetch_build_logs(&self, build_id: &str) -> String {
        match self.fetch_inner(build_id).await {
            Ok(logs) => logs,
            Err(e) => {
                tracing::error!(build_id = %build_id, error = %e, "failed to fetch build logs");
                String::new()
            }
        }
    }
}

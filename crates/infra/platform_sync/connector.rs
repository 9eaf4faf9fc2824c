use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::domain::{
    repositories::platform_sync::PlatformSync, value_objects::ingestion_jobs::SyncRequest,
};

const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub base_url: Url,
    pub token: Option<String>,
    pub request_timeout: Duration,
}

/// Hands a sync job to the platform connector service at `POST {base_url}/sync/{platform}`.
pub struct ConnectorPlatformSync {
    config: ConnectorConfig,
    client: Client,
}

impl ConnectorPlatformSync {
    pub fn new(config: ConnectorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build connector http client")?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, request: &SyncRequest) -> Result<Url> {
        let base = if self.config.base_url.path().ends_with('/') {
            self.config.base_url.clone()
        } else {
            let mut base = self.config.base_url.clone();
            base.set_path(&format!("{}/", base.path()));
            base
        };

        base.join(&format!("sync/{}", request.platform))
            .context("failed to build connector url")
    }
}

#[async_trait]
impl PlatformSync for ConnectorPlatformSync {
    async fn sync(&self, request: SyncRequest) -> Result<()> {
        let url = self.endpoint(&request)?;
        debug!(job_id = %request.job_id, platform = %request.platform, %url, "platform_sync: dispatching");

        let mut builder = self.client.post(url).json(&json!({
            "jobId": request.job_id,
            "ownerId": request.owner_id,
            "platform": request.platform,
            "payload": request.payload,
        }));
        if let Some(token) = self.config.token.as_deref() {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("{} connector request failed", request.platform))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
            bail!(
                "{} connector returned status {}: {}",
                request.platform,
                status.as_u16(),
                body
            );
        }

        Ok(())
    }
}

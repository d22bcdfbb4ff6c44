//! Campaign REST API client
//!
//! HTTP client for the campaign backend's read endpoints.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::error::{extract_error_message, ApiError};
use crate::models::{
    AllCampaignInsights, AllInsightsEnvelope, Campaign, CampaignEnvelope, CampaignInsight,
    CampaignList, InsightEnvelope,
};
use crate::stream;

/// Configuration for the campaign API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the campaign API (e.g., "http://localhost:4000")
    pub base_url: String,
    /// Total timeout for one read request
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Campaign API client
pub struct CampaignClient {
    client: Client,
    config: ClientConfig,
}

impl CampaignClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// List all campaigns
    pub async fn list_campaigns(&self) -> Result<CampaignList, ApiError> {
        self.get_json("/campaigns").await
    }

    /// Fetch one campaign by id
    pub async fn get_campaign(&self, id: &str) -> Result<Campaign, ApiError> {
        let path = format!("/campaigns/{}", urlencoding::encode(id));
        let envelope: CampaignEnvelope = self.get_json(&path).await?;
        Ok(envelope.campaign)
    }

    /// Aggregate insights across all campaigns
    pub async fn all_insights(&self) -> Result<AllCampaignInsights, ApiError> {
        let envelope: AllInsightsEnvelope = self.get_json("/campaigns/insights").await?;
        Ok(envelope.insights)
    }

    /// Latest insight snapshot for one campaign
    ///
    /// Useful as the initial snapshot of a live stream.
    pub async fn campaign_insights(&self, id: &str) -> Result<CampaignInsight, ApiError> {
        let path = format!("/campaigns/{}/insights", urlencoding::encode(id));
        let envelope: InsightEnvelope = self.get_json(&path).await?;
        Ok(envelope.insights)
    }

    /// URL of the campaign's live insight stream
    pub fn stream_url(&self, id: &str) -> String {
        stream::stream_url(self.base_url(), id)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url(), path);
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::from_send)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::from_send)?;

        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("Something went wrong");
            let message = extract_error_message(&body, fallback);
            tracing::warn!(url = %url, status = status.as_u16(), message = %message, "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

//! Response envelopes of the campaign read endpoints

use serde::{Deserialize, Serialize};

use super::{AllCampaignInsights, Campaign, CampaignInsight};

/// `GET /campaigns`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignList {
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
    #[serde(default)]
    pub total: u64,
}

/// `GET /campaigns/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignEnvelope {
    pub campaign: Campaign,
}

/// `GET /campaigns/insights`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllInsightsEnvelope {
    pub insights: AllCampaignInsights,
}

/// `GET /campaigns/{id}/insights`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightEnvelope {
    pub insights: CampaignInsight,
}

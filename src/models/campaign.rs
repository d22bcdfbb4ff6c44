//! Campaign records
//!
//! A `Campaign` is owned and mutated only by the remote API; the client holds
//! it as an immutable snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A marketing campaign record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    /// Opaque identifier assigned by the API
    pub id: String,
    /// Display name
    pub name: String,
    /// Lifecycle status
    pub status: CampaignStatus,
    /// Owning brand
    pub brand_id: String,
    /// Total budget (currency amount)
    pub budget: f64,
    /// Daily budget cap (currency amount)
    pub daily_budget: f64,
    /// Platforms the campaign runs on, in API order
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Whether the campaign runs on the given platform (case-insensitive)
    pub fn runs_on(&self, platform: &str) -> bool {
        self.platforms
            .iter()
            .any(|p| p.eq_ignore_ascii_case(platform))
    }
}

/// Campaign lifecycle status
///
/// Unknown values are kept verbatim in `Other` so that a newer API never
/// breaks list rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CampaignStatus {
    Active,
    Paused,
    Completed,
    Other(String),
}

impl CampaignStatus {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Other(s) => s,
        }
    }

    /// Badge label shown next to the campaign name
    pub fn badge(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl From<String> for CampaignStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "active" => CampaignStatus::Active,
            "paused" => CampaignStatus::Paused,
            "completed" => CampaignStatus::Completed,
            _ => CampaignStatus::Other(s),
        }
    }
}

impl From<CampaignStatus> for String {
    fn from(status: CampaignStatus) -> Self {
        match status {
            CampaignStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

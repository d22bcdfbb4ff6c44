//! Campaign data model
//!
//! Read-only value snapshots returned by the campaign API:
//!
//! - **campaign**: `Campaign` records and their `CampaignStatus`
//! - **insight**: per-campaign `CampaignInsight` snapshots and the
//!   cross-campaign `AllCampaignInsights` aggregate
//! - **envelope**: the JSON envelopes each read endpoint wraps its payload in
//!
//! Nothing here is persisted; values live as long as the screen showing them.

pub mod campaign;
pub mod envelope;
pub mod insight;

pub use campaign::{Campaign, CampaignStatus};
pub use envelope::{AllInsightsEnvelope, CampaignEnvelope, CampaignList, InsightEnvelope};
pub use insight::{AllCampaignInsights, CampaignInsight};

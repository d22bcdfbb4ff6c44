//! # Campaign Pulse
//!
//! Client-side dashboard for a marketing campaign API: campaign listings,
//! campaign details, aggregate insights and a live metrics card fed by a
//! server-push stream.
//!
//! ## Modules
//!
//! - [`models`]: campaign and insight value types
//! - [`client`]: REST client for the read endpoints
//! - [`stream`]: live insight stream handler and its connection state machine
//! - [`format`]: number, currency and percentage formatting
//! - [`view`]: terminal renderings of the dashboard screens
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use campaign_pulse::client::{CampaignClient, ClientConfig};
//! use campaign_pulse::view;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CampaignClient::new(ClientConfig::default())?;
//!
//!     let campaigns = client.list_campaigns().await?;
//!     print!("{}", view::render_campaign_table(&campaigns));
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod format;
pub mod models;
pub mod stream;
pub mod view;

// Re-export top-level types for convenience
pub use models::{AllCampaignInsights, Campaign, CampaignInsight, CampaignList, CampaignStatus};

pub use client::{ApiError, CampaignClient, ClientConfig, Fetch};

pub use stream::{
    ConnectionState, HttpTransport, InsightSource, InsightTransport, LiveInsights, LiveView,
    ReconnectPolicy, StreamError, StreamOptions,
};

pub use format::{compact_number, format_currency, percent, CurrencyStyle, MetricTile};

pub use config::{Config, ConfigError};

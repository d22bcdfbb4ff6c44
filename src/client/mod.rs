//! Campaign API Client
//!
//! Read-only access to the campaign backend.
//!
//! - **CampaignClient**: REST client for the four read endpoints
//! - **Fetch**: loading / failed / loaded state of one request, with manual
//!   retry

mod error;
mod fetch;
mod http;

pub use error::{extract_error_message, ApiError};
pub use fetch::Fetch;
pub use http::{CampaignClient, ClientConfig};

//! Live Campaign Insights
//!
//! Streams per-campaign insight snapshots over a server-push connection and
//! tracks the health of that connection.
//!
//! ## Architecture
//!
//! - **sse**: incremental `text/event-stream` decoder
//! - **transport**: the `InsightTransport` seam and its HTTP implementation
//! - **handler**: `LiveInsights`, the per-campaign connection owner and state
//!   machine
//! - **state**: `ConnectionState` and the `LiveView` exposed to renderers
//!
//! ## Example
//!
//! ```rust,no_run
//! use campaign_pulse::stream::{HttpTransport, InsightSource, StreamOptions};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = Arc::new(HttpTransport::new(Duration::from_secs(10))?);
//!     let source = InsightSource::new("http://localhost:4000", transport, StreamOptions::default());
//!
//!     let mut live = source.activate("cmp_01", None);
//!     while let Some(view) = live.changed().await {
//!         println!("{}: {:?}", view.state, view.insight);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod handler;
pub mod sse;
mod state;
mod transport;

pub use error::StreamError;
pub use handler::{stream_url, InsightSource, LiveInsights, ReconnectPolicy, StreamOptions};
pub use sse::{SseDecoder, SseEvent};
pub use state::{ConnectionState, LiveView};
pub use transport::{EventStream, HttpTransport, InsightTransport};

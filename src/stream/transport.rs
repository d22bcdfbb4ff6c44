//! Push connection transports
//!
//! The live handler only needs "open a connection, then read events until it
//! fails". `InsightTransport` is that seam; `HttpTransport` is the production
//! implementation over a streaming reqwest response.

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

use super::error::StreamError;
use super::sse::{SseDecoder, SseEvent};

/// Events of one open connection, in delivery order
///
/// Dropping the stream closes the connection.
pub type EventStream = BoxStream<'static, Result<SseEvent, StreamError>>;

/// Something that can open a server-push connection
#[async_trait]
pub trait InsightTransport: Send + Sync + 'static {
    /// Open a connection to `url`
    ///
    /// Resolving to `Ok` means the connection is open; the returned stream
    /// yields events until the transport fails or the server ends it.
    async fn open(&self, url: &str) -> Result<EventStream, StreamError>;
}

/// Server-sent events over HTTP
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport
    ///
    /// Only the connect phase is bounded by `connect_timeout`; an open stream
    /// may stay idle indefinitely.
    pub fn new(connect_timeout: Duration) -> Result<Self, StreamError> {
        let client = Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client (must not carry a total request timeout)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InsightTransport for HttpTransport {
    async fn open(&self, url: &str) -> Result<EventStream, StreamError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("text/event-stream") {
            return Err(StreamError::ContentType(content_type));
        }

        let mut decoder = SseDecoder::new();
        let events = response
            .bytes_stream()
            .map(move |chunk| chunk.map(|bytes| decoder.feed(&bytes)))
            .flat_map(|chunk| match chunk {
                Ok(events) => {
                    stream::iter(events.into_iter().map(Ok::<_, StreamError>)).left_stream()
                }
                Err(e) => stream::iter(vec![Err(StreamError::Request(e))]).right_stream(),
            });

        Ok(events.boxed())
    }
}

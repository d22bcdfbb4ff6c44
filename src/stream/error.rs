//! Insight stream error types

use thiserror::Error;

/// Transport failures of a push connection
///
/// None of these surface to callers of the live handler; they only drive the
/// connection-state indicator and the logs.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Connecting or reading the body failed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Stream endpoint returned status {0}")]
    Status(u16),

    /// Server answered with something other than an event stream
    #[error("Unexpected content type: {0}")]
    ContentType(String),

    /// Server ended the response body
    #[error("Stream closed by server")]
    Closed,

    /// Failure reported by a non-HTTP transport
    #[error("Transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            StreamError::Status(503).to_string(),
            "Stream endpoint returned status 503"
        );
        assert_eq!(StreamError::Closed.to_string(), "Stream closed by server");
    }
}

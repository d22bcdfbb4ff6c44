//! Campaign API client errors

use thiserror::Error;

/// Errors that can occur when reading from the campaign API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Campaign API unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success status; `message` is the best description the body offered
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a transport-level reqwest failure
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Unavailable
        } else {
            ApiError::Request(e)
        }
    }

    /// Short text for a failed screen
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Unavailable => "Campaign API is unreachable".to_string(),
            ApiError::Timeout => "Campaign API did not respond in time".to_string(),
            other => other.to_string(),
        }
    }
}

/// Pick a human-readable message out of an error response body
///
/// Prefers a `message` field, then an `error` field, then `fallback`.
pub fn extract_error_message(body: &str, fallback: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();

    parsed
        .as_ref()
        .and_then(|v| {
            ["message", "error"].iter().find_map(|key| {
                v.get(key)
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| fallback.to_string())
}

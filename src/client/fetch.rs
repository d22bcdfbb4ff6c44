//! Request state for one screen
//!
//! Each screen issues one read and shows a skeleton, an error with a retry
//! action, or the data. There is no automatic retry and no caching.

use std::future::Future;

use super::error::ApiError;

/// Loading / failed / loaded state of a single read
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Loading,
    Failed(String),
    Loaded(T),
}

impl<T> Fetch<T> {
    /// Run `request` once and capture its outcome
    pub async fn load<F, Fut>(request: F) -> Self
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match request().await {
            Ok(value) => Fetch::Loaded(value),
            Err(e) => {
                tracing::warn!(error = %e, "Fetch failed");
                Fetch::Failed(e.user_message())
            }
        }
    }

    /// Re-issue the request, replacing the current state
    pub async fn retry<F, Fut>(&mut self, request: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        *self = Fetch::Loading;
        *self = Self::load(request).await;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Fetch::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Fetch::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Fetch::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn into_loaded(self) -> Option<T> {
        match self {
            Fetch::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

//! Connection health and the view exposed by a live handler

use serde::{Deserialize, Serialize};

use crate::models::CampaignInsight;

/// Health of the push connection
///
/// Describes only the transport; a `Live` stream may still be showing an old
/// snapshot if the server has not sent anything new.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// First connection attempt in flight
    Connecting,
    /// Connection open
    Live,
    /// Connection failed, waiting out the offline delay
    Reconnecting,
    /// Delay elapsed without a working connection
    Offline,
}

impl ConnectionState {
    /// Badge label
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Live => "Live",
            ConnectionState::Reconnecting => "Reconnecting",
            ConnectionState::Offline => "Offline",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Live => write!(f, "live"),
            ConnectionState::Reconnecting => write!(f, "reconnecting"),
            ConnectionState::Offline => write!(f, "offline"),
        }
    }
}

/// Everything a live metrics card renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveView {
    pub state: ConnectionState,
    /// Latest successfully parsed snapshot
    pub insight: Option<CampaignInsight>,
    /// When `insight` was last refreshed (server timestamp, else receive time)
    pub last_updated: Option<String>,
}

impl LiveView {
    /// View at activation time
    pub fn connecting(initial: Option<CampaignInsight>) -> Self {
        let last_updated = initial.as_ref().and_then(|i| i.timestamp.clone());
        Self {
            state: ConnectionState::Connecting,
            insight: initial,
            last_updated,
        }
    }
}

//! Performance insight snapshots

use indexmap::IndexMap;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latest known performance snapshot for a single campaign
///
/// Each stream message carries a complete snapshot; a newer one replaces the
/// older one wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignInsight {
    #[serde(deserialize_with = "counter")]
    pub impressions: u64,
    #[serde(deserialize_with = "counter")]
    pub clicks: u64,
    #[serde(deserialize_with = "counter")]
    pub conversions: u64,
    /// Amount spent so far (currency amount)
    pub spend: f64,
    /// Click-through rate, clicks / impressions
    pub ctr: f64,
    /// Cost per click, spend / clicks
    pub cpc: f64,
    /// Conversions / clicks
    pub conversion_rate: f64,
    /// Server-side snapshot time, passed through verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl CampaignInsight {
    /// Parse a stream payload
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// Counters may arrive as JSON integers or floats (`100` or `100.0`)
///
/// Fractional floats are rounded; negative or non-finite values are rejected.
fn counter<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct CounterVisitor;

    impl<'de> Visitor<'de> for CounterVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative number")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
            if v.is_finite() && v >= 0.0 && v <= u64::MAX as f64 {
                Ok(v.round() as u64)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(CounterVisitor)
}

/// Aggregate metrics across all campaigns, keyed by metric name
///
/// Keys keep the order in which the API sent them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AllCampaignInsights(pub IndexMap<String, f64>);

impl AllCampaignInsights {
    /// Look up one aggregate value
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.0.get(metric).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//! Presentation formatting
//!
//! Pure number, currency and percentage formatting used by the dashboard
//! views. Nothing here touches I/O or state.

use serde::{Deserialize, Serialize};

use crate::models::CampaignInsight;

/// Placeholder for values that cannot be shown
pub const MISSING: &str = "—";

/// Currency and locale variants used across the dashboard
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CurrencyStyle {
    /// `₹1,23,456`: Indian grouping, whole rupees (live metrics card)
    #[default]
    Inr,
    /// `$123,456.5`: US grouping, up to two decimals (campaign table)
    Usd,
    /// `₹ 1,23,456.5`: Indian grouping, up to two decimals (detail view)
    InrSpaced,
}

impl std::str::FromStr for CurrencyStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inr" => Ok(CurrencyStyle::Inr),
            "usd" => Ok(CurrencyStyle::Usd),
            "inr-spaced" | "inr_spaced" => Ok(CurrencyStyle::InrSpaced),
            other => Err(format!(
                "Invalid currency style: {}. Use inr, usd, or inr-spaced",
                other
            )),
        }
    }
}

/// Compact en-US notation with at most one fraction digit (`1.2K`, `3.4M`)
pub fn compact_number(value: f64) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }

    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    let mut scaled = round_to_tenth(abs);
    let mut suffix = "";

    for (index, (threshold, unit)) in UNITS.iter().enumerate() {
        if abs >= *threshold {
            scaled = round_to_tenth(abs / threshold);
            suffix = unit;

            // 999.95K rounds up to 1000K, which reads as 1M
            if scaled >= 1000.0 && index > 0 {
                let (bigger, bigger_unit) = UNITS[index - 1];
                scaled = round_to_tenth(abs / bigger);
                suffix = bigger_unit;
            }
            break;
        }
    }

    // Sub-thousand values that round up to 1000 become 1K
    if suffix.is_empty() && scaled >= 1000.0 {
        scaled = 1.0;
        suffix = "K";
    }

    format!("{}{}{}", sign, trim_fraction(&format!("{:.1}", scaled)), suffix)
}

/// Format a currency amount in one of the dashboard's styles
pub fn format_currency(value: f64, style: CurrencyStyle) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    match style {
        CurrencyStyle::Inr => {
            let (whole, _) = split_decimal(abs, 0);
            format!("{}₹{}", sign, group_indian(&whole))
        }
        CurrencyStyle::Usd => {
            let (whole, fraction) = split_decimal(abs, 2);
            format!("{}${}{}", sign, group_thousands(&whole), fraction)
        }
        CurrencyStyle::InrSpaced => {
            let (whole, fraction) = split_decimal(abs, 2);
            format!("{}₹ {}{}", sign, group_indian(&whole), fraction)
        }
    }
}

/// Plain en-US number with up to two fraction digits (`12,345.5`)
pub fn format_decimal(value: f64) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let (whole, fraction) = split_decimal(value.abs(), 2);
    format!("{}{}{}", sign, group_thousands(&whole), fraction)
}

/// Ratio as a percentage with two decimals (`0.1` → `10.00%`)
pub fn percent(ratio: f64) -> String {
    if !ratio.is_finite() {
        return MISSING.to_string();
    }
    format!("{:.2}%", ratio * 100.0)
}

/// One labelled figure on a metrics card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricTile {
    pub label: &'static str,
    pub value: String,
}

impl MetricTile {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

/// The four headline tiles of the live metrics card
pub fn metric_tiles(insight: &CampaignInsight, style: CurrencyStyle) -> [MetricTile; 4] {
    [
        MetricTile::new("Impressions", compact_number(insight.impressions as f64)),
        MetricTile::new("Clicks", compact_number(insight.clicks as f64)),
        MetricTile::new("Conversions", compact_number(insight.conversions as f64)),
        MetricTile::new("Spend", format_currency(insight.spend, style)),
    ]
}

/// Derived ratios shown under the headline tiles
pub fn secondary_stats(insight: &CampaignInsight, style: CurrencyStyle) -> [MetricTile; 3] {
    [
        MetricTile::new("CTR", percent(insight.ctr)),
        MetricTile::new("CPC", format_currency(insight.cpc, style)),
        MetricTile::new("CVR", percent(insight.conversion_rate)),
    ]
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn trim_fraction(formatted: &str) -> String {
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted.to_string()
    }
}

/// Round to `decimals` places; returns the integer digits and a `.xx` suffix
/// with trailing zeros removed (empty when whole)
fn split_decimal(abs: f64, decimals: usize) -> (String, String) {
    let formatted = format!("{:.*}", decimals, abs);
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            let fraction = if fraction.is_empty() {
                String::new()
            } else {
                format!(".{}", fraction)
            };
            (whole.to_string(), fraction)
        }
        None => (formatted, String::new()),
    }
}

/// `1234567` → `1,234,567`
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `1234567` → `12,34,567`
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, c) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push(',');
    out.push_str(tail);
    out
}

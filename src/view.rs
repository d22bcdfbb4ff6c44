//! Terminal views
//!
//! Renders the dashboard screens as plain text. Every function is pure and
//! returns the full screen; the binary decides where to print it.

use chrono::{DateTime, Utc};

use crate::format::{
    format_currency, format_decimal, metric_tiles, secondary_stats, CurrencyStyle, MetricTile,
};
use crate::models::{AllCampaignInsights, Campaign, CampaignList};
use crate::stream::LiveView;

const NAME_WIDTH: usize = 24;

/// Campaign table with one row per campaign
pub fn render_campaign_table(list: &CampaignList) -> String {
    if list.campaigns.is_empty() {
        return "No campaigns found\n".to_string();
    }

    let mut lines = Vec::with_capacity(list.campaigns.len() + 3);
    lines.push(format!(
        "{:<14} {:<24} {:<10} {:>14} {:>14} {:<24} {}",
        "ID", "Name", "Status", "Budget", "Daily Budget", "Platforms", "Created"
    ));
    lines.push("-".repeat(112));

    for campaign in &list.campaigns {
        lines.push(format!(
            "{:<14} {:<24} {:<10} {:>14} {:>14} {:<24} {}",
            campaign.id,
            truncate(&campaign.name, NAME_WIDTH),
            campaign.status.as_str(),
            format_currency(campaign.budget, CurrencyStyle::Usd),
            format_currency(campaign.daily_budget, CurrencyStyle::Usd),
            platforms(campaign),
            campaign.created_at.format("%Y-%m-%d"),
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} of {} campaigns",
        list.campaigns.len(),
        list.total
    ));

    lines.join("\n") + "\n"
}

/// Detail screen for one campaign
pub fn render_campaign_detail(campaign: &Campaign) -> String {
    let style = CurrencyStyle::InrSpaced;
    let lines = [
        format!("{}  [{}]", campaign.name, campaign.status.badge()),
        String::new(),
        format!("  {:<14} {}", "ID", campaign.id),
        format!("  {:<14} {}", "Brand", campaign.brand_id),
        format!("  {:<14} {}", "Budget", format_currency(campaign.budget, style)),
        format!(
            "  {:<14} {}",
            "Daily Budget",
            format_currency(campaign.daily_budget, style)
        ),
        format!("  {:<14} {}", "Platforms", platforms(campaign)),
        format!(
            "  {:<14} {}",
            "Created",
            campaign.created_at.format("%Y-%m-%d %H:%M UTC")
        ),
    ];

    lines.join("\n") + "\n"
}

/// Aggregate insights across all campaigns, in response order
pub fn render_insights_panel(insights: &AllCampaignInsights) -> String {
    if insights.is_empty() {
        return "No insights available\n".to_string();
    }

    let mut lines = vec!["Campaign Insights".to_string(), "-".repeat(40)];
    for (metric, value) in insights.iter() {
        lines.push(format!("{:<24} {:>15}", humanize(metric), format_decimal(value)));
    }

    lines.join("\n") + "\n"
}

/// Live metrics card
pub fn render_live_card(view: &LiveView, style: CurrencyStyle) -> String {
    let mut lines = vec![format!(
        "Live Metrics  [{}]",
        view.state.label().to_uppercase()
    )];
    lines.push(String::new());

    match &view.insight {
        Some(insight) => {
            let tiles = metric_tiles(insight, style);
            lines.push(tile_row(&tiles, |t| t.label.to_string()));
            lines.push(tile_row(&tiles, |t| t.value.clone()));
            lines.push(String::new());

            let stats: Vec<String> = secondary_stats(insight, style)
                .iter()
                .map(|s| format!("{} {}", s.label, s.value))
                .collect();
            lines.push(stats.join("  ·  "));
        }
        None => lines.push("Waiting for first insight event...".to_string()),
    }

    if let Some(updated) = &view.last_updated {
        lines.push(String::new());
        lines.push(format!("Last updated {}", display_timestamp(updated)));
    }

    lines.join("\n") + "\n"
}

fn tile_row<F>(tiles: &[MetricTile], cell: F) -> String
where
    F: Fn(&MetricTile) -> String,
{
    tiles
        .iter()
        .map(|t| format!("{:<14}", cell(t)))
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn platforms(campaign: &Campaign) -> String {
    if campaign.platforms.is_empty() {
        "-".to_string()
    } else {
        campaign.platforms.join(", ")
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

/// `conversion_rate` → `Conversion Rate`
fn humanize(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// RFC 3339 timestamps are shown in UTC; anything else verbatim
fn display_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

//! `trends` command: ranked trending-video table.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde_json::Value;
use trendix_backend::TrendixClient;
use trendix_core::{
    format::{format_compact, time_ago},
    history::parse_snapshot_date,
    lenient::{value_as_count, value_as_text},
    project, AppConfig, ProjectedTrendRecord, TrendQuery,
};

const TITLE_WIDTH: usize = 48;

/// Fetches, re-ranks and prints trending videos.
///
/// # Errors
///
/// Returns an error for an unsupported platform or a failed backend request.
pub(crate) async fn run_trends(
    client: &TrendixClient,
    config: &AppConfig,
    query: &TrendQuery,
) -> anyhow::Result<()> {
    let window = query.resolve(&config.bounds);
    window.ensure_supported(&config.platforms)?;

    let records = client.fetch_trend_videos(&window).await?;
    let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
    let ranked = project(&records, limit);

    tracing::debug!(
        fetched = records.len(),
        shown = ranked.len(),
        "trend videos ranked"
    );

    print!("{}", render_table(&ranked, Utc::now()));
    println!(
        "{} of {} requested \u{00b7} last {} day(s) \u{00b7} velocity {}d",
        ranked.len(),
        window.limit,
        window.days,
        window.velocity_days
    );
    Ok(())
}

pub(crate) fn render_table(items: &[ProjectedTrendRecord], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:>8}  {:>7}  {:>7}  {:>8}  {}",
        "#", "SURGE", "VIEWS", "LIKES", "AGE", "TITLE"
    );

    for (idx, item) in items.iter().enumerate() {
        let score = item
            .surge_score
            .as_ref()
            .and_then(Value::as_f64)
            .map_or_else(|| "\u{2014}".to_string(), |s| format!("{s:.2}"));
        let views = compact_count(item.view_count.as_ref());
        let likes = compact_count(item.like_count.as_ref());
        let age = item
            .published_at
            .as_ref()
            .and_then(Value::as_str)
            .and_then(parse_snapshot_date)
            .map_or_else(|| "\u{2014}".to_string(), |p| time_ago(p, now));
        let title = item
            .title
            .as_ref()
            .and_then(value_as_text)
            .unwrap_or_else(|| "(untitled)".to_string());
        let title = truncate(&title, TITLE_WIDTH);

        let _ = writeln!(
            out,
            "{:>3}  {score:>8}  {views:>7}  {likes:>7}  {age:>8}  {title}",
            idx + 1
        );
    }
    out
}

fn compact_count(value: Option<&Value>) -> String {
    value
        .and_then(value_as_count)
        .map_or_else(|| "\u{2014}".to_string(), format_compact)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}\u{2026}")
    }
}

//! `history` and `compare` commands.

use std::fmt::Write as _;

use trendix_backend::{HistoryPanel, PanelState, TrendixClient};
use trendix_core::{
    compare::{compare, Comparison, VideoSnapshot, Winner},
    format::{format_change, format_compact},
    AppConfig, Metric, NormalizedSeries,
};

const BAR_WIDTH: usize = 40;

/// Loads one video's history through the detail panel and prints the chart
/// for `metric`.
///
/// # Errors
///
/// Returns an error for an unsupported platform. Backend failures render as
/// an empty chart, the same as the dashboard.
pub(crate) async fn run_history(
    client: &TrendixClient,
    config: &AppConfig,
    video_id: &str,
    metric: Metric,
    platform: &str,
) -> anyhow::Result<()> {
    let platform = platform.to_lowercase();
    anyhow::ensure!(
        config.supports_platform(&platform),
        "platform '{platform}' is not supported"
    );

    let panel = HistoryPanel::new();
    let token = panel.select(video_id).await;
    panel
        .load(client, token, &platform, config.history_limit)
        .await;

    let PanelState::Ready { charts, .. } = panel.state().await else {
        anyhow::bail!("history for {video_id} did not finish loading");
    };

    let series = match metric {
        Metric::Views => &charts.views,
        Metric::Likes => &charts.likes,
    };
    print!("{}", render_chart(series, metric));
    Ok(())
}

/// Fetches both histories concurrently and prints per-metric winners.
///
/// # Errors
///
/// Returns an error for an unsupported platform or if either fetch fails.
pub(crate) async fn run_compare(
    client: &TrendixClient,
    config: &AppConfig,
    video_a: &str,
    video_b: &str,
    platform: &str,
) -> anyhow::Result<()> {
    let platform = platform.to_lowercase();
    anyhow::ensure!(
        config.supports_platform(&platform),
        "platform '{platform}' is not supported"
    );

    let (history_a, history_b) = tokio::try_join!(
        client.fetch_view_history(video_a, &platform, config.history_limit),
        client.fetch_view_history(video_b, &platform, config.history_limit),
    )?;

    let a = VideoSnapshot::from_history(&history_a);
    let b = VideoSnapshot::from_history(&history_b);
    let result = compare(&a, &b);

    print!("{}", render_comparison(video_a, video_b, &a, &b, &result));
    Ok(())
}

/// Text rendering of a delta-scaled bar chart, oldest snapshot first.
pub(crate) fn render_chart(series: &NormalizedSeries, metric: Metric) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{metric} trend");

    if series.is_empty() {
        let _ = writeln!(out, "  no data");
        return out;
    }

    let label_width = series
        .points
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);

    for point in &series.points {
        let bar = "\u{2588}".repeat(bar_cells(series.height_fraction(point)));
        let _ = writeln!(
            out,
            "  {:<label_width$}  {bar:<bar_width$}  +{} (total {})",
            point.label,
            format_compact(point.delta),
            format_compact(point.raw_value),
            bar_width = BAR_WIDTH,
        );
    }

    let change = if series.is_constant {
        "no change".to_string()
    } else {
        format_change(series.net_change)
    };
    let _ = writeln!(
        out,
        "  MIN: 0  MAX: {}  {change}",
        format_compact(series.max_delta)
    );
    let _ = writeln!(out, "  baseline (min): {}", format_compact(series.min));
    out
}

/// Bars never vanish entirely: every point keeps at least one cell.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar_cells(fraction: f64) -> usize {
    let cells = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    cells.max(1)
}

pub(crate) fn render_comparison(
    video_a: &str,
    video_b: &str,
    a: &VideoSnapshot,
    b: &VideoSnapshot,
    result: &Comparison,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<16}  {:>12}  {:>12}  WINNER", "", video_a, video_b);

    let rows = [
        (
            "views",
            format_compact(a.view_count),
            format_compact(b.view_count),
            result.views,
        ),
        (
            "likes",
            format_compact(a.like_count),
            format_compact(b.like_count),
            result.likes,
        ),
        (
            "comments",
            format_compact(a.comment_count),
            format_compact(b.comment_count),
            result.comments,
        ),
        (
            "view growth %",
            format!("{:.1}", a.view_growth_rate),
            format!("{:.1}", b.view_growth_rate),
            result.view_growth_rate,
        ),
        (
            "like ratio %",
            format!("{:.2}", a.like_ratio),
            format!("{:.2}", b.like_ratio),
            result.like_ratio,
        ),
    ];

    for (name, left, right, winner) in rows {
        let _ = writeln!(
            out,
            "{name:<16}  {left:>12}  {right:>12}  {}",
            winner_label(winner, video_a, video_b)
        );
    }
    let _ = writeln!(
        out,
        "overall: {}",
        winner_label(result.overall, video_a, video_b)
    );
    out
}

fn winner_label<'a>(winner: Winner, video_a: &'a str, video_b: &'a str) -> &'a str {
    match winner {
        Winner::A => video_a,
        Winner::B => video_b,
        Winner::Tie => "tie",
    }
}

//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)
//!
//! The value formatters are shared with the TUI so both front-ends render
//! money, counts, and missing values identically.

use std::collections::HashSet;

use crate::app::pipeline::{CleanedData, DashboardData};
use crate::domain::WEEKDAY_LABELS;

/// `1234.5` -> `"$1,234.50"`.
pub fn fmt_usd(v: f64) -> String {
    format!("${}", fmt_grouped(v, 2))
}

/// `1234567.0` -> `"1,234,567"`.
pub fn fmt_count(v: f64) -> String {
    fmt_grouped(v, 0)
}

/// Plain two-decimal ratio, `"-"` when there is no data.
pub fn fmt_ratio(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// Percent with two decimals, `"-"` when there is no data.
pub fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}%"),
        None => "-".to_string(),
    }
}

/// Currency, `"-"` when there is no data.
pub fn fmt_usd_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => fmt_usd(v),
        None => "-".to_string(),
    }
}

/// Fixed-precision rendering with thousands separators in the integer part.
fn fmt_grouped(v: f64, decimals: usize) -> String {
    let rendered = format!("{:.decimals$}", v.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let grouped: Vec<String> = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();

    let sign = if v < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{}.{f}", grouped.join(",")),
        None => format!("{sign}{}", grouped.join(",")),
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

/// Format the run summary: source, row counters, date range, selection.
pub fn format_run_summary(
    cleaned: &CleanedData,
    selected: &HashSet<String>,
    source_desc: &str,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== adash - Campaign Performance ({source_desc}) ===\n"));
    out.push_str(&format!(
        "Rows: {} read | {} used | {} skipped\n",
        cleaned.rows_read,
        cleaned.rows_used,
        cleaned.row_errors.len()
    ));

    if let (Some(min), Some(max)) = (cleaned.stats.date_min, cleaned.stats.date_max) {
        out.push_str(&format!("Dates: {min} -> {max}\n"));
    }
    out.push_str(&format!(
        "Campaigns: {} total | {} selected\n",
        cleaned.campaigns.len(),
        selected.len()
    ));

    if !cleaned.row_errors.is_empty() {
        out.push_str("\nSkipped rows:\n");
        for err in cleaned.row_errors.iter().take(5) {
            out.push_str(&format!("  row {}: {}\n", err.row, err.message));
        }
        if cleaned.row_errors.len() > 5 {
            out.push_str(&format!("  ... and {} more\n", cleaned.row_errors.len() - 5));
        }
    }

    out
}

/// Format every dashboard section for `adash report`.
pub fn format_dashboard(data: &DashboardData) -> String {
    let mut out = String::new();

    out.push_str("Key metrics:\n");
    out.push_str(&format!("  Total spend        {}\n", fmt_usd(data.kpis.total_spend)));
    out.push_str(&format!(
        "  Total impressions  {}\n",
        fmt_count(data.kpis.total_impressions)
    ));
    out.push_str(&format!("  Average ROAS       {}\n", fmt_ratio(data.kpis.avg_roas)));
    out.push_str(&format!("  Average CTR        {}\n", fmt_pct(data.kpis.avg_ctr)));
    out.push_str(&format!("  Average CPA        {}\n", fmt_usd_opt(data.kpis.avg_cpa)));
    out.push_str(&format!("  Total revenue      {}\n", fmt_usd(data.kpis.total_revenue)));
    out.push('\n');

    out.push_str("Conversion funnel:\n");
    out.push_str(&format!("  Impressions  {}\n", fmt_count(data.funnel.impressions)));
    out.push_str(&format!(
        "  Clicks       {}  ({:.2}% CTR)\n",
        fmt_count(data.funnel.clicks),
        data.funnel.ctr_pct
    ));
    out.push_str(&format!(
        "  Conversions  {}  ({:.2}% CVR)\n",
        fmt_count(data.funnel.conversions as f64),
        data.funnel.cvr_pct
    ));
    out.push('\n');

    out.push_str("Spend over time:\n");
    out.push_str(&format!("  {:<12} {:>14}\n", "date", "spend"));
    for (date, spend) in &data.spend_by_date {
        out.push_str(&format!("  {:<12} {:>14}\n", date.to_string(), fmt_usd(*spend)));
    }
    out.push('\n');

    out.push_str("ROAS by campaign:\n");
    out.push_str(&format!("  {:<28} {:>8} {:<8}\n", "campaign", "roas", "tier"));
    for row in &data.roas_by_campaign {
        out.push_str(&format!(
            "  {:<28} {:>8.2} {:<8}\n",
            truncate(&row.campaign, 28),
            row.roas,
            row.tier.display_name()
        ));
    }
    out.push('\n');

    out.push_str("Revenue share by campaign:\n");
    let revenue_total: f64 = data.revenue_share.iter().map(|(_, v)| v).sum();
    for (campaign, revenue) in &data.revenue_share {
        let share = if revenue_total > 0.0 {
            revenue / revenue_total * 100.0
        } else {
            0.0
        };
        out.push_str(&format!(
            "  {:<28} {:>14} {:>7.1}%\n",
            truncate(campaign, 28),
            fmt_usd(*revenue),
            share
        ));
    }
    out.push('\n');

    out.push_str("Budget utilization:\n");
    out.push_str(&format!("  {:<28} {:>14} {:>8}\n", "campaign", "spend", "roas"));
    for row in &data.budget_util {
        out.push_str(&format!(
            "  {:<28} {:>14} {:>8}\n",
            truncate(&row.campaign, 28),
            fmt_usd(row.spend),
            fmt_ratio(row.roas)
        ));
    }
    out.push('\n');

    out.push_str("Campaign performance:\n");
    out.push_str(&format!(
        "  {:<28} {:>8} {:>10} {:>8}\n",
        "campaign", "ctr", "cpa", "roas"
    ));
    for row in &data.performance {
        out.push_str(&format!(
            "  {:<28} {:>8} {:>10} {:>8}\n",
            truncate(&row.campaign, 28),
            fmt_pct(row.ctr),
            fmt_usd_opt(row.cpa),
            fmt_ratio(row.roas)
        ));
    }
    out.push('\n');

    out.push_str("Day-wise ROAS:\n");
    for (label, value) in WEEKDAY_LABELS.iter().zip(data.weekday_roas.iter()) {
        out.push_str(&format!("  {:<10} {:>8}\n", label, fmt_ratio(*value)));
    }

    out
}

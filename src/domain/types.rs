//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - cloned freely between the pipeline and the TUI
//! - aggregated without touching the loader again
//! - formatted late (presentation decides units and precision)

use chrono::NaiveDate;

/// Expected worksheet column headers, exactly as they appear in the sheet.
pub const COL_DATE: &str = "Date";
pub const COL_CAMPAIGN: &str = "Campaign name";
pub const COL_COST: &str = "Cost (USD)";
pub const COL_ROAS: &str = "Return on ad spend (ROAS)";
pub const COL_CPM: &str = "CPM (cost per 1000 impressions)";
pub const COL_CPA: &str = "Cost per action (CPA)";
pub const COL_CONVERSION_VALUE: &str = "Website purchases conversion value";
pub const COL_CTR: &str = "CTR (link click-through rate)";
pub const COL_IMPRESSIONS: &str = "Impressions";
pub const COL_LINK_CLICKS: &str = "Link clicks";

/// Raw worksheet content as fetched: a header row plus data rows, in
/// spreadsheet row order. Cells are strings; normalization happens later.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One cleaned row of campaign performance data.
///
/// Numeric columns are `Option<f64>`: `Some` values are always finite, and
/// `None` is the explicit missing marker for cells that did not contain a
/// parseable number. Reductions skip missing values rather than zeroing them.
#[derive(Debug, Clone, PartialEq)]
pub struct AdRecord {
    pub date: NaiveDate,
    pub campaign: String,

    /// Spend in USD.
    pub cost: Option<f64>,
    /// Return on ad spend (revenue / cost).
    pub roas: Option<f64>,
    /// Cost per 1000 impressions.
    pub cpm: Option<f64>,
    /// Cost per action.
    pub cpa: Option<f64>,
    /// Purchase conversion value in USD. The funnel counts rows where this
    /// is present, so an empty cell must stay `None` rather than become 0.
    pub conversion_value: Option<f64>,
    /// Link click-through rate, already in percent units (e.g. `3.2`).
    pub ctr: Option<f64>,
    pub impressions: Option<f64>,
    pub link_clicks: Option<f64>,
}

/// Selects one numeric column of an `AdRecord` for group reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cost,
    Roas,
    Cpm,
    Cpa,
    ConversionValue,
    Ctr,
    Impressions,
    LinkClicks,
}

impl Metric {
    pub fn value(self, record: &AdRecord) -> Option<f64> {
        match self {
            Metric::Cost => record.cost,
            Metric::Roas => record.roas,
            Metric::Cpm => record.cpm,
            Metric::Cpa => record.cpa,
            Metric::ConversionValue => record.conversion_value,
            Metric::Ctr => record.ctr,
            Metric::Impressions => record.impressions,
            Metric::LinkClicks => record.link_clicks,
        }
    }

    /// Column header this metric was parsed from.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Cost => COL_COST,
            Metric::Roas => COL_ROAS,
            Metric::Cpm => COL_CPM,
            Metric::Cpa => COL_CPA,
            Metric::ConversionValue => COL_CONVERSION_VALUE,
            Metric::Ctr => COL_CTR,
            Metric::Impressions => COL_IMPRESSIONS,
            Metric::LinkClicks => COL_LINK_CLICKS,
        }
    }
}

/// Three-way ROAS performance tier used to color the by-campaign chart.
///
/// Boundaries: a campaign returning more than 3x its spend is `High`; between
/// 1x (inclusive) and 3x (inclusive) is `Medium`; below 1x it loses money.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoasTier {
    High,
    Medium,
    Low,
}

impl RoasTier {
    pub fn classify(roas: f64) -> Self {
        if roas > 3.0 {
            RoasTier::High
        } else if roas >= 1.0 {
            RoasTier::Medium
        } else {
            RoasTier::Low
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            RoasTier::High => "high",
            RoasTier::Medium => "medium",
            RoasTier::Low => "low",
        }
    }
}

/// Weekday labels in the fixed Monday-first order used by the day-wise view.
pub const WEEKDAY_LABELS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roas_tier_boundaries() {
        assert_eq!(RoasTier::classify(3.0), RoasTier::Medium);
        assert_eq!(RoasTier::classify(3.01), RoasTier::High);
        assert_eq!(RoasTier::classify(1.0), RoasTier::Medium);
        assert_eq!(RoasTier::classify(0.99), RoasTier::Low);
    }

    #[test]
    fn metric_selects_expected_field() {
        let record = AdRecord {
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            campaign: "Prospecting".to_string(),
            cost: Some(12.5),
            roas: Some(2.0),
            cpm: None,
            cpa: Some(4.0),
            conversion_value: None,
            ctr: Some(3.2),
            impressions: Some(1000.0),
            link_clicks: Some(32.0),
        };

        assert_eq!(Metric::Cost.value(&record), Some(12.5));
        assert_eq!(Metric::Cpm.value(&record), None);
        assert_eq!(Metric::ConversionValue.value(&record), None);
        assert_eq!(Metric::LinkClicks.value(&record), Some(32.0));
    }
}

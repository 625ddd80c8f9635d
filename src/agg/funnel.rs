//! Conversion funnel: impressions → clicks → conversions.

use crate::domain::{AdRecord, Metric};

use super::metric_sum;

#[derive(Debug, Clone, PartialEq)]
pub struct Funnel {
    pub impressions: f64,
    pub clicks: f64,
    /// Number of rows that recorded any conversion value. A count, not a
    /// sum: revenue totals live in the KPI cards.
    pub conversions: usize,
    /// clicks / impressions × 100, 0 when there were no impressions.
    pub ctr_pct: f64,
    /// conversions / clicks × 100, 0 when there were no clicks.
    pub cvr_pct: f64,
}

pub fn compute_funnel(records: &[AdRecord]) -> Funnel {
    let impressions = metric_sum(records, Metric::Impressions);
    let clicks = metric_sum(records, Metric::LinkClicks);
    let conversions = records
        .iter()
        .filter(|r| r.conversion_value.is_some())
        .count();

    let ctr_pct = if impressions > 0.0 {
        clicks / impressions * 100.0
    } else {
        0.0
    };
    let cvr_pct = if clicks > 0.0 {
        conversions as f64 / clicks * 100.0
    } else {
        0.0
    };

    Funnel {
        impressions,
        clicks,
        conversions,
        ctr_pct,
        cvr_pct,
    }
}

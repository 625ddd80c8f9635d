//! Single-scalar KPI cards.

use crate::domain::{AdRecord, Metric};

use super::{metric_mean, metric_sum};

/// Headline numbers for the dashboard's KPI row.
///
/// Totals are plain sums (0 over an empty dataset). Averages carry the
/// no-data marker through so presentation can render a dash instead of a
/// misleading zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub total_spend: f64,
    pub total_impressions: f64,
    pub avg_roas: Option<f64>,
    pub avg_ctr: Option<f64>,
    pub avg_cpa: Option<f64>,
    pub total_revenue: f64,
}

pub fn compute_kpis(records: &[AdRecord]) -> Kpis {
    Kpis {
        total_spend: metric_sum(records, Metric::Cost),
        total_impressions: metric_sum(records, Metric::Impressions),
        avg_roas: metric_mean(records, Metric::Roas),
        avg_ctr: metric_mean(records, Metric::Ctr),
        avg_cpa: metric_mean(records, Metric::Cpa),
        total_revenue: metric_sum(records, Metric::ConversionValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_dataset_degrades_gracefully() {
        let kpis = compute_kpis(&[]);
        assert_eq!(kpis.total_spend, 0.0);
        assert_eq!(kpis.total_impressions, 0.0);
        assert_eq!(kpis.total_revenue, 0.0);
        assert_eq!(kpis.avg_roas, None);
        assert_eq!(kpis.avg_ctr, None);
        assert_eq!(kpis.avg_cpa, None);
    }

    #[test]
    fn kpis_sum_and_average_present_values() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let mk = |cost, roas, value| AdRecord {
            date,
            campaign: "A".to_string(),
            cost: Some(cost),
            roas,
            cpm: None,
            cpa: None,
            conversion_value: value,
            ctr: None,
            impressions: Some(1000.0),
            link_clicks: None,
        };

        let records = vec![
            mk(100.0, Some(2.0), Some(200.0)),
            mk(50.0, None, None),
            mk(150.0, Some(4.0), Some(600.0)),
        ];

        let kpis = compute_kpis(&records);
        assert_eq!(kpis.total_spend, 300.0);
        assert_eq!(kpis.total_impressions, 3000.0);
        assert_eq!(kpis.avg_roas, Some(3.0));
        assert_eq!(kpis.total_revenue, 800.0);
    }
}

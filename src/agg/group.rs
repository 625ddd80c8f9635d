//! Grouped and scalar reductions.
//!
//! Missing metric values (`None`) never contribute to a sum or a mean; a
//! group made entirely of missing values sums to 0 and has no mean.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::{AdRecord, Metric};

#[derive(Debug, Clone, Copy, Default)]
struct Accum {
    sum: f64,
    count: usize,
}

impl Accum {
    fn mean(self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

fn fold_by<K: Ord>(
    records: &[AdRecord],
    metric: Metric,
    key_of: impl Fn(&AdRecord) -> K,
) -> BTreeMap<K, Accum> {
    let mut groups: BTreeMap<K, Accum> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(key_of(record)).or_default();
        if let Some(v) = metric.value(record) {
            entry.sum += v;
            entry.count += 1;
        }
    }
    groups
}

/// Sum `metric` per calendar date, ascending by date.
pub fn sum_by_date(records: &[AdRecord], metric: Metric) -> Vec<(NaiveDate, f64)> {
    fold_by(records, metric, |r| r.date)
        .into_iter()
        .map(|(date, accum)| (date, accum.sum))
        .collect()
}

/// Sum `metric` per campaign, ascending by name.
pub fn sum_by_campaign(records: &[AdRecord], metric: Metric) -> Vec<(String, f64)> {
    fold_by(records, metric, |r| r.campaign.clone())
        .into_iter()
        .map(|(name, accum)| (name, accum.sum))
        .collect()
}

/// Mean of `metric` per calendar date, ascending by date. Dates whose values
/// are all missing are omitted.
pub fn mean_by_date(records: &[AdRecord], metric: Metric) -> Vec<(NaiveDate, f64)> {
    fold_by(records, metric, |r| r.date)
        .into_iter()
        .filter_map(|(date, accum)| accum.mean().map(|m| (date, m)))
        .collect()
}

/// Sum of `metric` per weekday in fixed Monday→Sunday order, `None` for
/// weekdays with no observations.
pub fn sum_by_weekday(records: &[AdRecord], metric: Metric) -> [Option<f64>; 7] {
    let mut slots = [Accum::default(); 7];
    for record in records {
        if let Some(v) = metric.value(record) {
            let idx = record.date.weekday().num_days_from_monday() as usize;
            slots[idx].sum += v;
            slots[idx].count += 1;
        }
    }
    slots.map(|accum| if accum.count == 0 { None } else { Some(accum.sum) })
}

/// Mean of `metric` per campaign, ascending by name. Campaigns whose values
/// are all missing are omitted (there is nothing to average).
pub fn mean_by_campaign(records: &[AdRecord], metric: Metric) -> Vec<(String, f64)> {
    fold_by(records, metric, |r| r.campaign.clone())
        .into_iter()
        .filter_map(|(name, accum)| accum.mean().map(|m| (name, m)))
        .collect()
}

/// Mean of `metric` per weekday in fixed Monday→Sunday order.
///
/// All seven slots are always present; a weekday with no observations is
/// `None`, never zero, so charts can leave a gap instead of drawing a bar.
pub fn mean_by_weekday(records: &[AdRecord], metric: Metric) -> [Option<f64>; 7] {
    let mut slots = [Accum::default(); 7];
    for record in records {
        if let Some(v) = metric.value(record) {
            let idx = record.date.weekday().num_days_from_monday() as usize;
            slots[idx].sum += v;
            slots[idx].count += 1;
        }
    }
    slots.map(Accum::mean)
}

/// Sum of `metric` over the whole dataset (0 when empty or all missing).
pub fn metric_sum(records: &[AdRecord], metric: Metric) -> f64 {
    records.iter().filter_map(|r| metric.value(r)).sum()
}

/// Mean of `metric` over the whole dataset; `None` is the no-data marker.
pub fn metric_mean(records: &[AdRecord], metric: Metric) -> Option<f64> {
    let mut accum = Accum::default();
    for record in records {
        if let Some(v) = metric.value(record) {
            accum.sum += v;
            accum.count += 1;
        }
    }
    accum.mean()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(campaign: &str, date: (i32, u32, u32), roas: Option<f64>, cost: Option<f64>) -> AdRecord {
        AdRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            campaign: campaign.to_string(),
            cost,
            roas,
            cpm: None,
            cpa: None,
            conversion_value: None,
            ctr: None,
            impressions: None,
            link_clicks: None,
        }
    }

    #[test]
    fn empty_dataset_yields_empty_groups() {
        assert!(sum_by_date(&[], Metric::Cost).is_empty());
        assert!(sum_by_campaign(&[], Metric::Cost).is_empty());
        assert!(mean_by_campaign(&[], Metric::Roas).is_empty());
        assert_eq!(metric_sum(&[], Metric::Cost), 0.0);
        assert_eq!(metric_mean(&[], Metric::Roas), None);
    }

    #[test]
    fn sums_group_by_date_in_ascending_order() {
        let records = vec![
            record("A", (2025, 5, 2), None, Some(3.0)),
            record("B", (2025, 5, 1), None, Some(1.0)),
            record("A", (2025, 5, 2), None, Some(2.0)),
        ];

        let by_date = sum_by_date(&records, Metric::Cost);
        assert_eq!(by_date.len(), 2);
        assert_eq!(by_date[0], (NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(), 1.0));
        assert_eq!(by_date[1], (NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(), 5.0));
    }

    #[test]
    fn means_skip_missing_values() {
        let records = vec![
            record("A", (2025, 5, 1), Some(2.0), None),
            record("A", (2025, 5, 2), None, None),
            record("A", (2025, 5, 3), Some(4.0), None),
            record("B", (2025, 5, 1), None, None),
        ];

        let means = mean_by_campaign(&records, Metric::Roas);
        // B has no ROAS observations at all, so it is omitted.
        assert_eq!(means, vec![("A".to_string(), 3.0)]);
    }

    #[test]
    fn all_missing_group_sums_to_zero() {
        let records = vec![record("A", (2025, 5, 1), None, None)];
        assert_eq!(sum_by_campaign(&records, Metric::Cost), vec![("A".to_string(), 0.0)]);
    }

    #[test]
    fn weekday_means_fill_all_seven_slots_monday_first() {
        // 2025-05-05 is a Monday, 2025-05-11 a Sunday.
        let records = vec![
            record("A", (2025, 5, 5), Some(2.0), None),
            record("A", (2025, 5, 12), Some(4.0), None),
            record("A", (2025, 5, 11), Some(1.0), None),
        ];

        let weekday = mean_by_weekday(&records, Metric::Roas);
        assert_eq!(weekday.len(), 7);
        assert_eq!(weekday[0], Some(3.0)); // two Mondays averaged
        assert_eq!(weekday[6], Some(1.0)); // Sunday
        for slot in &weekday[1..6] {
            assert_eq!(*slot, None); // days without data stay missing
        }
    }

    #[test]
    fn weekday_means_on_empty_input_are_all_missing() {
        assert_eq!(mean_by_weekday(&[], Metric::Roas), [None; 7]);
        assert_eq!(sum_by_weekday(&[], Metric::Cost), [None; 7]);
    }

    #[test]
    fn date_means_and_weekday_sums() {
        let records = vec![
            record("A", (2025, 5, 5), Some(2.0), Some(10.0)),
            record("A", (2025, 5, 5), Some(4.0), Some(5.0)),
            record("A", (2025, 5, 6), None, Some(1.0)),
        ];

        let means = mean_by_date(&records, Metric::Roas);
        // The 6th has no ROAS observation, so only the 5th appears.
        assert_eq!(means, vec![(NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(), 3.0)]);

        let sums = sum_by_weekday(&records, Metric::Cost);
        assert_eq!(sums[0], Some(15.0)); // Monday the 5th
        assert_eq!(sums[1], Some(1.0)); // Tuesday the 6th
        assert_eq!(sums[2], None);
    }

    #[test]
    fn scalar_reductions() {
        let records = vec![
            record("A", (2025, 5, 1), Some(1.0), Some(10.0)),
            record("A", (2025, 5, 2), Some(3.0), None),
        ];

        assert_eq!(metric_sum(&records, Metric::Cost), 10.0);
        assert_eq!(metric_mean(&records, Metric::Roas), Some(2.0));
    }
}

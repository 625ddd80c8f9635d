//! Shared recompute pipeline used by both the `report` command and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load (memoized) -> normalize -> filter -> aggregate
//!
//! The CLI and the TUI then focus on presentation (printing vs widgets).
//! Every selection change re-runs `recompute` in full; nothing computed here
//! outlives the render that consumes it.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::agg::{
    compute_funnel, compute_kpis, mean_by_campaign, mean_by_weekday, sum_by_campaign, sum_by_date,
    Funnel, Kpis,
};
use crate::data::DataSource;
use crate::domain::{AdRecord, Metric, RoasTier};
use crate::error::AppError;
use crate::filter::{campaign_names, filter_campaigns};
use crate::ingest::{ingest, DatasetStats, RowError};

/// Cleaned dataset plus everything the selector and summaries need.
#[derive(Debug, Clone)]
pub struct CleanedData {
    pub records: Vec<AdRecord>,
    /// Unique campaign names in spreadsheet order (the selector options).
    pub campaigns: Vec<String>,
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
    pub stats: DatasetStats,
}

/// Mean ROAS per campaign with its performance tier.
#[derive(Debug, Clone)]
pub struct CampaignRoas {
    pub campaign: String,
    pub roas: f64,
    pub tier: RoasTier,
}

/// Spend total next to ROAS mean, the budget-utilization view.
#[derive(Debug, Clone)]
pub struct CampaignSpend {
    pub campaign: String,
    pub spend: f64,
    pub roas: Option<f64>,
}

/// Per-campaign CTR/CPA/ROAS means; also the heatmap rows.
#[derive(Debug, Clone)]
pub struct CampaignPerf {
    pub campaign: String,
    pub ctr: Option<f64>,
    pub cpa: Option<f64>,
    pub roas: Option<f64>,
}

/// All aggregates for one render, computed fresh per selection change.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub kpis: Kpis,
    pub spend_by_date: Vec<(NaiveDate, f64)>,
    pub roas_by_campaign: Vec<CampaignRoas>,
    pub revenue_share: Vec<(String, f64)>,
    pub budget_util: Vec<CampaignSpend>,
    pub performance: Vec<CampaignPerf>,
    pub weekday_roas: [Option<f64>; 7],
    pub funnel: Funnel,
    /// The filtered rows themselves, for the raw-data table.
    pub rows: Vec<AdRecord>,
}

/// Fetch (through the source's cache) and normalize.
pub fn load_and_clean(source: &mut DataSource) -> Result<CleanedData, AppError> {
    let table = source.load()?;
    let ingested = ingest(&table)?;
    let campaigns = campaign_names(&ingested.records);

    Ok(CleanedData {
        records: ingested.records,
        campaigns,
        rows_read: ingested.rows_read,
        rows_used: ingested.rows_used,
        row_errors: ingested.row_errors,
        stats: ingested.stats,
    })
}

/// Filter by the current selection and compute every aggregate the
/// dashboard renders. Pure; an empty selection produces empty/zero results.
pub fn recompute(records: &[AdRecord], selected: &HashSet<String>) -> DashboardData {
    let rows = filter_campaigns(records, selected);

    let roas_means: BTreeMap<String, f64> =
        mean_by_campaign(&rows, Metric::Roas).into_iter().collect();

    let roas_by_campaign = roas_means
        .iter()
        .map(|(campaign, &roas)| CampaignRoas {
            campaign: campaign.clone(),
            roas,
            tier: RoasTier::classify(roas),
        })
        .collect();

    let budget_util = sum_by_campaign(&rows, Metric::Cost)
        .into_iter()
        .map(|(campaign, spend)| {
            let roas = roas_means.get(&campaign).copied();
            CampaignSpend {
                campaign,
                spend,
                roas,
            }
        })
        .collect();

    let performance = performance_by_campaign(&rows, &roas_means);

    DashboardData {
        kpis: compute_kpis(&rows),
        spend_by_date: sum_by_date(&rows, Metric::Cost),
        roas_by_campaign,
        revenue_share: sum_by_campaign(&rows, Metric::ConversionValue),
        budget_util,
        performance,
        weekday_roas: mean_by_weekday(&rows, Metric::Roas),
        funnel: compute_funnel(&rows),
        rows,
    }
}

fn performance_by_campaign(
    rows: &[AdRecord],
    roas_means: &BTreeMap<String, f64>,
) -> Vec<CampaignPerf> {
    let ctr_means: BTreeMap<String, f64> =
        mean_by_campaign(rows, Metric::Ctr).into_iter().collect();
    let cpa_means: BTreeMap<String, f64> =
        mean_by_campaign(rows, Metric::Cpa).into_iter().collect();

    let campaigns: BTreeSet<&String> = rows.iter().map(|r| &r.campaign).collect();
    campaigns
        .into_iter()
        .map(|campaign| CampaignPerf {
            campaign: campaign.clone(),
            ctr: ctr_means.get(campaign).copied(),
            cpa: cpa_means.get(campaign).copied(),
            roas: roas_means.get(campaign).copied(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(campaign: &str, day: u32, cost: f64, roas: f64, value: Option<f64>) -> AdRecord {
        AdRecord {
            date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            campaign: campaign.to_string(),
            cost: Some(cost),
            roas: Some(roas),
            cpm: None,
            cpa: Some(10.0),
            conversion_value: value,
            ctr: Some(2.0),
            impressions: Some(1000.0),
            link_clicks: Some(20.0),
        }
    }

    fn dataset() -> Vec<AdRecord> {
        vec![
            record("A", 1, 100.0, 4.0, Some(400.0)),
            record("A", 2, 50.0, 2.0, None),
            record("B", 1, 200.0, 0.5, Some(100.0)),
        ]
    }

    fn select(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn full_selection_matches_unfiltered_aggregates() {
        use crate::agg::{compute_funnel, compute_kpis, sum_by_campaign, sum_by_date};

        let records = dataset();
        let all = select(&["A", "B"]);

        // Selecting every campaign must reproduce aggregates computed with no
        // filter stage at all.
        let filtered = recompute(&records, &all);
        assert_eq!(filtered.kpis, compute_kpis(&records));
        assert_eq!(filtered.spend_by_date, sum_by_date(&records, Metric::Cost));
        assert_eq!(
            filtered.revenue_share,
            sum_by_campaign(&records, Metric::ConversionValue)
        );
        assert_eq!(filtered.funnel, compute_funnel(&records));
        assert_eq!(filtered.rows, records);
    }

    #[test]
    fn empty_selection_degrades_to_zeroes() {
        let records = dataset();
        let data = recompute(&records, &HashSet::new());

        assert!(data.rows.is_empty());
        assert!(data.spend_by_date.is_empty());
        assert!(data.roas_by_campaign.is_empty());
        assert!(data.revenue_share.is_empty());
        assert!(data.performance.is_empty());
        assert_eq!(data.weekday_roas, [None; 7]);
        assert_eq!(data.kpis.total_spend, 0.0);
        assert_eq!(data.kpis.avg_roas, None);
        assert_eq!(data.funnel.ctr_pct, 0.0);
        assert_eq!(data.funnel.cvr_pct, 0.0);
    }

    #[test]
    fn tiers_follow_the_campaign_roas_mean() {
        let records = dataset();
        let data = recompute(&records, &select(&["A", "B"]));

        let a = data
            .roas_by_campaign
            .iter()
            .find(|c| c.campaign == "A")
            .unwrap();
        let b = data
            .roas_by_campaign
            .iter()
            .find(|c| c.campaign == "B")
            .unwrap();

        assert_eq!(a.roas, 3.0);
        assert_eq!(a.tier, RoasTier::Medium);
        assert_eq!(b.tier, RoasTier::Low);
    }

    #[test]
    fn budget_util_pairs_spend_totals_with_roas_means() {
        let records = dataset();
        let data = recompute(&records, &select(&["A"]));

        assert_eq!(data.budget_util.len(), 1);
        let a = &data.budget_util[0];
        assert_eq!(a.spend, 150.0);
        assert_eq!(a.roas, Some(3.0));
    }

    #[test]
    fn selection_subset_only_counts_its_own_rows() {
        let records = dataset();
        let data = recompute(&records, &select(&["B"]));

        assert_eq!(data.kpis.total_spend, 200.0);
        assert_eq!(data.funnel.conversions, 1);
        assert_eq!(data.rows.len(), 1);
    }
}

//! Deterministic synthetic worksheet generation.
//!
//! The sample mirrors what the real sheet export looks like, formatting
//! included: currency cells carry `$` and thousands separators, CTR carries a
//! trailing `%`, and some conversion-value cells are empty. Running it through
//! the normalizer therefore exercises the same cleaning path as live data,
//! which is what makes `--sample` useful for offline work and tests.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{
    COL_CAMPAIGN, COL_CONVERSION_VALUE, COL_COST, COL_CPA, COL_CPM, COL_CTR, COL_DATE,
    COL_IMPRESSIONS, COL_LINK_CLICKS, COL_ROAS, RawTable,
};
use crate::error::AppError;

struct CampaignProfile {
    name: &'static str,
    /// Mean daily spend in USD.
    cost_mean: f64,
    /// Mean CPM in USD.
    cpm_mean: f64,
    /// Mean CTR in percent.
    ctr_mean: f64,
    /// Mean ROAS; spread across tiers so the tier coloring has variety.
    roas_mean: f64,
    roas_sd: f64,
    /// Probability that a day records no conversion value at all.
    missing_conversions: f64,
}

const PROFILES: [CampaignProfile; 4] = [
    CampaignProfile {
        name: "Prospecting - Broad",
        cost_mean: 420.0,
        cpm_mean: 9.5,
        ctr_mean: 1.4,
        roas_mean: 0.9,
        roas_sd: 0.3,
        missing_conversions: 0.20,
    },
    CampaignProfile {
        name: "Retargeting - 30d",
        cost_mean: 180.0,
        cpm_mean: 14.0,
        ctr_mean: 3.1,
        roas_mean: 4.2,
        roas_sd: 0.8,
        missing_conversions: 0.05,
    },
    CampaignProfile {
        name: "Lookalike 1%",
        cost_mean: 260.0,
        cpm_mean: 11.0,
        ctr_mean: 2.0,
        roas_mean: 2.1,
        roas_sd: 0.6,
        missing_conversions: 0.10,
    },
    CampaignProfile {
        name: "Brand - Search",
        cost_mean: 90.0,
        cpm_mean: 7.0,
        ctr_mean: 4.5,
        roas_mean: 3.4,
        roas_sd: 0.9,
        missing_conversions: 0.08,
    },
];

/// Generate a synthetic worksheet: one row per campaign per day.
pub fn generate_sample(seed: u64, days: u32) -> Result<RawTable, AppError> {
    if days == 0 {
        return Err(AppError::usage("Sample day count must be > 0."));
    }

    let start = NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid fixed start date");
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::upstream(format!("Noise distribution error: {e}")))?;

    let headers: Vec<String> = [
        COL_DATE,
        COL_CAMPAIGN,
        COL_COST,
        COL_ROAS,
        COL_CPM,
        COL_CPA,
        COL_CONVERSION_VALUE,
        COL_CTR,
        COL_IMPRESSIONS,
        COL_LINK_CLICKS,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let mut rows = Vec::with_capacity(days as usize * PROFILES.len());
    for day in 0..days {
        let date = start + Duration::days(day as i64);
        for profile in &PROFILES {
            rows.push(sample_row(date, profile, &mut rng, &noise));
        }
    }

    Ok(RawTable { headers, rows })
}

fn sample_row(
    date: NaiveDate,
    profile: &CampaignProfile,
    rng: &mut StdRng,
    noise: &Normal<f64>,
) -> Vec<String> {
    let cost = (profile.cost_mean * (1.0 + 0.25 * noise.sample(rng))).max(5.0);
    let cpm = (profile.cpm_mean * (1.0 + 0.10 * noise.sample(rng))).max(1.0);
    let impressions = (cost / cpm * 1000.0).round().max(100.0);
    let ctr = (profile.ctr_mean * (1.0 + 0.20 * noise.sample(rng))).max(0.2);
    let clicks = (impressions * ctr / 100.0).round().max(1.0);
    let roas = (profile.roas_mean + profile.roas_sd * noise.sample(rng)).max(0.0);

    // Roughly 8% of clicks convert; CPA follows from that.
    let conversions = (clicks * 0.08).round().max(1.0);
    let cpa = cost / conversions;

    let conversion_value = if rng.gen_bool(profile.missing_conversions) {
        String::new()
    } else {
        usd(cost * roas)
    };

    vec![
        date.format("%Y-%m-%d").to_string(),
        profile.name.to_string(),
        usd(cost),
        format!("{roas:.2}"),
        usd(cpm),
        usd(cpa),
        conversion_value,
        format!("{ctr:.2}%"),
        commas(impressions),
        commas(clicks),
    ]
}

/// `1234567` -> `"1,234,567"` (integer rendering, like the sheet's counts).
fn commas(v: f64) -> String {
    let digits = format!("{:.0}", v.abs());
    let grouped: Vec<String> = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();
    grouped.join(",")
}

/// `1234.5` -> `"$1,234.50"` (currency rendering, like the sheet's money cells).
fn usd(v: f64) -> String {
    let cents = format!("{:.2}", v.abs());
    let (int_part, frac_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let grouped: Vec<String> = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();
    format!("${}.{frac_part}", grouped.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_table() {
        let a = generate_sample(42, 7).unwrap();
        let b = generate_sample(42, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn one_row_per_campaign_per_day() {
        let table = generate_sample(1, 10).unwrap();
        assert_eq!(table.rows.len(), 10 * PROFILES.len());
        assert_eq!(table.headers.len(), 10);
    }

    #[test]
    fn money_cells_carry_sheet_formatting() {
        assert_eq!(usd(1234.5), "$1,234.50");
        assert_eq!(usd(0.75), "$0.75");
        assert_eq!(commas(1234567.0), "1,234,567");
        assert_eq!(commas(950.0), "950");
    }

    #[test]
    fn zero_days_is_a_usage_error() {
        assert_eq!(generate_sample(1, 0).unwrap_err().exit_code(), 2);
    }
}

//! Worksheet normalization.
//!
//! This module turns the raw, string-formatted worksheet into clean
//! `AdRecord`s that are safe to aggregate.
//!
//! Design goals:
//! - **Strict schema** for the expected columns (clear errors + exit code 2)
//! - **Row-level tolerance** for bad values (skip/blank, but report what happened)
//! - **Deterministic behavior** (fixed date formats, no locale lookups)
//! - **Separation of concerns**: no aggregation logic here
//!
//! Error policy: a cell that fails numeric extraction becomes the missing
//! marker (`None`) and the row survives; a row whose `Date` cannot be parsed
//! or whose `Campaign name` is blank is dropped and recorded as a `RowError`.
//! The run only fails outright (exit code 3) when nothing survives. The
//! upstream dashboard this replaces aborted the whole view on the first bad
//! cell; tolerating and reporting is a deliberate behavior change, surfaced
//! in the run summary so bad rows never disappear silently.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{
    AdRecord, COL_CAMPAIGN, COL_CONVERSION_VALUE, COL_COST, COL_CPA, COL_CPM, COL_CTR, COL_DATE,
    COL_IMPRESSIONS, COL_LINK_CLICKS, COL_ROAS, RawTable,
};
use crate::error::AppError;

/// A row-level problem encountered during normalization.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based spreadsheet row number (header row is 1).
    pub row: usize,
    pub message: String,
}

/// Summary stats about the records that survived cleaning.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_records: usize,
    pub n_campaigns: usize,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
}

/// Normalization output: cleaned records + row errors + counters.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<AdRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
    pub stats: DatasetStats,
}

/// Column indices resolved from the header row.
struct Columns {
    date: usize,
    campaign: usize,
    cost: usize,
    roas: usize,
    cpm: usize,
    cpa: usize,
    conversion_value: usize,
    ctr: usize,
    impressions: usize,
    link_clicks: usize,
}

/// Clean a raw worksheet into `AdRecord`s, preserving row order.
pub fn ingest(table: &RawTable) -> Result<IngestedData, AppError> {
    let header_map = build_header_map(&table.headers);
    let columns = resolve_columns(&header_map)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut row_errors = Vec::new();

    for (idx, cells) in table.rows.iter().enumerate() {
        // +2: the header occupies spreadsheet row 1 and rows are 1-based.
        let row = idx + 2;
        match parse_row(cells, &columns) {
            Ok(record) => records.push(record),
            Err(message) => row_errors.push(RowError { row, message }),
        }
    }

    let rows_read = table.rows.len();
    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::no_data(
            "No valid rows remain after normalization.",
        ));
    }

    let stats = compute_stats(&records);

    Ok(IngestedData {
        records,
        row_errors,
        rows_read,
        rows_used,
        stats,
    })
}

fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Sheet exports sometimes carry a BOM prefix on the first header. If we
    // don't strip it, schema validation incorrectly reports missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<Columns, AppError> {
    let required = |name: &str| -> Result<usize, AppError> {
        header_map
            .get(&normalize_header_name(name))
            .copied()
            .ok_or_else(|| AppError::usage(format!("Missing required column: `{name}`")))
    };

    Ok(Columns {
        date: required(COL_DATE)?,
        campaign: required(COL_CAMPAIGN)?,
        cost: required(COL_COST)?,
        roas: required(COL_ROAS)?,
        cpm: required(COL_CPM)?,
        cpa: required(COL_CPA)?,
        conversion_value: required(COL_CONVERSION_VALUE)?,
        ctr: required(COL_CTR)?,
        impressions: required(COL_IMPRESSIONS)?,
        link_clicks: required(COL_LINK_CLICKS)?,
    })
}

fn parse_row(cells: &[String], columns: &Columns) -> Result<AdRecord, String> {
    let date_raw = cell(cells, columns.date).ok_or("Missing `Date` value.")?;
    let date = parse_date(date_raw)?;

    let campaign = cell(cells, columns.campaign)
        .ok_or("Missing `Campaign name` value.")?
        .to_string();

    Ok(AdRecord {
        date,
        campaign,
        cost: number_at(cells, columns.cost),
        roas: number_at(cells, columns.roas),
        cpm: number_at(cells, columns.cpm),
        cpa: number_at(cells, columns.cpa),
        conversion_value: number_at(cells, columns.conversion_value),
        ctr: number_at(cells, columns.ctr),
        impressions: number_at(cells, columns.impressions),
        link_clicks: number_at(cells, columns.link_clicks),
    })
}

fn cell(cells: &[String], idx: usize) -> Option<&str> {
    cells.get(idx).map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn number_at(cells: &[String], idx: usize) -> Option<f64> {
    cell(cells, idx).and_then(parse_number)
}

/// Extract a number from formatted worksheet text.
///
/// Steps, mirroring what the sheet actually contains: drop percent signs and
/// thousands-separator commas, then take the first contiguous
/// `digits[.digits]` run and parse it. Currency symbols and surrounding
/// labels fall away because they sit outside that run. No match means the
/// value is missing, not zero.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '%' && *c != ',').collect();

    let bytes = cleaned.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;

    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    let v = cleaned[start..end].parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // The sheet normally exports ISO dates, but manual edits tend to show up
    // in US short form. We accept a small fixed set of formats to reduce
    // friction while keeping parsing deterministic.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, MM/DD/YYYY, YYYY/MM/DD, DD-Mon-YYYY."
    ))
}

fn compute_stats(records: &[AdRecord]) -> DatasetStats {
    let mut campaigns: Vec<&str> = records.iter().map(|r| r.campaign.as_str()).collect();
    campaigns.sort_unstable();
    campaigns.dedup();

    DatasetStats {
        n_records: records.len(),
        n_campaigns: campaigns.len(),
        date_min: records.iter().map(|r| r.date).min(),
        date_max: records.iter().map(|r| r.date).max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_sample;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn full_headers() -> Vec<&'static str> {
        vec![
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
    }

    #[test]
    fn parse_number_currency_and_percent() {
        assert_eq!(parse_number("$1,234.50"), Some(1234.50));
        assert_eq!(parse_number("  $ 1,234.50  "), Some(1234.50));
        assert_eq!(parse_number("3.2%"), Some(3.2));
        assert_eq!(parse_number("1,000,000"), Some(1_000_000.0));
        assert_eq!(parse_number("4.46"), Some(4.46));
        assert_eq!(parse_number("USD 12.5 approx"), Some(12.5));
    }

    #[test]
    fn parse_number_rejects_non_numeric_text() {
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("$"), None);
    }

    #[test]
    fn parse_number_takes_first_numeric_run() {
        assert_eq!(parse_number("3.2.4"), Some(3.2));
        assert_eq!(parse_number("12 per 34"), Some(12.0));
    }

    #[test]
    fn parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 5, 4).unwrap();
        assert_eq!(parse_date("2025-05-04").unwrap(), expected);
        assert_eq!(parse_date("05/04/2025").unwrap(), expected);
        assert_eq!(parse_date("2025/05/04").unwrap(), expected);
        assert_eq!(parse_date("04-May-2025").unwrap(), expected);
        assert!(parse_date("sometime in May").is_err());
    }

    #[test]
    fn ingest_cleans_formatted_cells() {
        let headers = full_headers();
        let t = table(
            &headers,
            &[&[
                "2025-05-01",
                "Prospecting",
                "$1,234.50",
                "4.46",
                "$9.80",
                "$23.10",
                "$5,512.00",
                "3.2%",
                "125,969",
                "4,031",
            ]],
        );

        let ingested = ingest(&t).unwrap();
        assert_eq!(ingested.rows_used, 1);
        let rec = &ingested.records[0];
        assert_eq!(rec.cost, Some(1234.50));
        assert_eq!(rec.roas, Some(4.46));
        assert_eq!(rec.ctr, Some(3.2));
        assert_eq!(rec.impressions, Some(125_969.0));
        assert_eq!(rec.conversion_value, Some(5512.0));
    }

    #[test]
    fn unparseable_numeric_becomes_missing_not_fatal() {
        let headers = full_headers();
        let t = table(
            &headers,
            &[&[
                "2025-05-01",
                "Prospecting",
                "n/a",
                "",
                "",
                "",
                "",
                "",
                "1,000",
                "30",
            ]],
        );

        let ingested = ingest(&t).unwrap();
        assert!(ingested.row_errors.is_empty());
        let rec = &ingested.records[0];
        assert_eq!(rec.cost, None);
        assert_eq!(rec.conversion_value, None);
        assert_eq!(rec.impressions, Some(1000.0));
    }

    #[test]
    fn bad_date_skips_row_with_error() {
        let headers = full_headers();
        let t = table(
            &headers,
            &[
                &["???", "A", "$1", "1", "1", "1", "1", "1%", "1", "1"],
                &["2025-05-02", "B", "$2", "2", "2", "2", "2", "2%", "2", "2"],
            ],
        );

        let ingested = ingest(&t).unwrap();
        assert_eq!(ingested.rows_read, 2);
        assert_eq!(ingested.rows_used, 1);
        assert_eq!(ingested.row_errors.len(), 1);
        assert_eq!(ingested.row_errors[0].row, 2);
        assert_eq!(ingested.records[0].campaign, "B");
    }

    #[test]
    fn all_rows_bad_is_a_no_data_error() {
        let headers = full_headers();
        let t = table(
            &headers,
            &[&["???", "A", "", "", "", "", "", "", "", ""]],
        );

        assert_eq!(ingest(&t).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn missing_column_is_a_usage_error() {
        let t = table(&[COL_DATE, COL_CAMPAIGN], &[&["2025-05-01", "A"]]);
        assert_eq!(ingest(&t).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn headers_match_case_insensitively_with_bom() {
        let mut headers = full_headers()
            .iter()
            .map(|s| s.to_uppercase())
            .collect::<Vec<_>>();
        headers[0] = format!("\u{feff}{}", headers[0]);

        let t = RawTable {
            headers,
            rows: vec![
                vec![
                    "2025-05-01".into(),
                    "A".into(),
                    "$1.00".into(),
                    "1".into(),
                    "1".into(),
                    "1".into(),
                    "1".into(),
                    "1%".into(),
                    "1".into(),
                    "1".into(),
                ],
            ],
        };

        assert!(ingest(&t).is_ok());
    }

    #[test]
    fn sample_worksheet_round_trips_cleanly() {
        let t = generate_sample(42, 14).unwrap();
        let ingested = ingest(&t).unwrap();
        assert_eq!(ingested.rows_read, ingested.rows_used);
        assert!(ingested.row_errors.is_empty());
        assert_eq!(ingested.stats.n_campaigns, 4);
        assert!(ingested.records.iter().all(|r| r.cost.is_some()));
    }

    #[test]
    fn stats_capture_date_range() {
        let headers = full_headers();
        let t = table(
            &headers,
            &[
                &["2025-05-03", "A", "$1", "1", "1", "1", "1", "1%", "1", "1"],
                &["2025-05-01", "A", "$1", "1", "1", "1", "1", "1%", "1", "1"],
            ],
        );

        let stats = ingest(&t).unwrap().stats;
        assert_eq!(stats.date_min, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(stats.date_max, NaiveDate::from_ymd_opt(2025, 5, 3));
        assert_eq!(stats.n_campaigns, 1);
    }
}

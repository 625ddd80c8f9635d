//! Google Sheets fetch for the campaign performance worksheet.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::RawTable;
use crate::error::AppError;

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct SheetsClient {
    client: Client,
    api_key: String,
    spreadsheet_id: String,
}

impl SheetsClient {
    /// Build a client from the environment (`.env` supported).
    ///
    /// Credentials are supplied out-of-band: `SHEETS_API_KEY` plus
    /// `SHEETS_SPREADSHEET_ID`. Neither is ever written back to.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("SHEETS_API_KEY")
            .map_err(|_| AppError::usage("Missing SHEETS_API_KEY in environment (.env)."))?;
        let spreadsheet_id = std::env::var("SHEETS_SPREADSHEET_ID")
            .map_err(|_| AppError::usage("Missing SHEETS_SPREADSHEET_ID in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            spreadsheet_id,
        })
    }

    /// Fetch one worksheet as a raw table. Read-only, single attempt; any
    /// retry cadence comes from the caller's cache expiry.
    pub fn fetch_worksheet(&self, worksheet: &str) -> Result<RawTable, AppError> {
        let url = format!("{BASE_URL}/{}/values/{}", self.spreadsheet_id, worksheet);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("majorDimension", "ROWS"),
                // Formatted values keep currency/percent text intact; the
                // normalizer owns the conversion to numbers.
                ("valueRenderOption", "FORMATTED_VALUE"),
            ])
            .send()
            .map_err(|e| AppError::upstream(format!("Sheets request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::upstream(format!(
                "Sheets request for worksheet '{worksheet}' failed with status {}.",
                resp.status()
            )));
        }

        let body: ValueRange = resp
            .json()
            .map_err(|e| AppError::upstream(format!("Failed to parse Sheets response: {e}")))?;

        table_from_values(worksheet, body.values)
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Convert the API's row-major value grid into `RawTable`.
///
/// The first row is the header row. Trailing empty cells are omitted by the
/// API, so data rows are padded to the header width.
fn table_from_values(worksheet: &str, values: Vec<Vec<serde_json::Value>>) -> Result<RawTable, AppError> {
    let mut iter = values.into_iter();

    let headers: Vec<String> = iter
        .next()
        .ok_or_else(|| {
            AppError::upstream(format!("Worksheet '{worksheet}' is empty (no header row)."))
        })?
        .into_iter()
        .map(cell_to_string)
        .collect();

    let width = headers.len();
    let rows = iter
        .map(|row| {
            let mut cells: Vec<String> = row.into_iter().map(cell_to_string).collect();
            cells.resize(width, String::new());
            cells
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cells(values: &[serde_json::Value]) -> Vec<serde_json::Value> {
        values.to_vec()
    }

    #[test]
    fn table_pads_short_rows_to_header_width() {
        let values = vec![
            cells(&[json!("Date"), json!("Campaign name"), json!("Cost (USD)")]),
            cells(&[json!("2025-05-01"), json!("Prospecting")]),
        ];

        let table = table_from_values("Sheet1", values).unwrap();
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows[0], vec!["2025-05-01", "Prospecting", ""]);
    }

    #[test]
    fn numeric_cells_become_text_for_the_normalizer() {
        let values = vec![
            cells(&[json!("Impressions")]),
            cells(&[json!(10250)]),
        ];

        let table = table_from_values("Sheet1", values).unwrap();
        assert_eq!(table.rows[0][0], "10250");
    }

    #[test]
    fn empty_worksheet_is_an_upstream_error() {
        let err = table_from_values("Sheet1", Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}

//! Campaign selection filter.
//!
//! Sits between cleaning and aggregation: the viewer picks a subset of
//! campaigns and everything downstream recomputes over that subset. An empty
//! selection is a valid state that yields an empty dataset, never an error.

use std::collections::HashSet;

use crate::domain::AdRecord;

/// Keep only records whose campaign is in `selected`, preserving row order.
pub fn filter_campaigns(records: &[AdRecord], selected: &HashSet<String>) -> Vec<AdRecord> {
    records
        .iter()
        .filter(|r| selected.contains(&r.campaign))
        .cloned()
        .collect()
}

/// Unique campaign names in first-seen (spreadsheet) order: the option list
/// for the multi-select.
pub fn campaign_names(records: &[AdRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for record in records {
        if seen.insert(record.campaign.as_str()) {
            names.push(record.campaign.clone());
        }
    }
    names
}

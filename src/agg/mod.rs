//! Aggregation stage: pure reductions over the filtered dataset.
//!
//! Responsibilities:
//!
//! - grouped sums/means by date, campaign, and weekday (`group`)
//! - single-scalar KPI cards (`kpi`)
//! - the impressions → clicks → conversions funnel (`funnel`)
//!
//! Every function here tolerates an empty input: sums come back 0, means come
//! back as an explicit no-data marker, and group results come back empty.

pub mod funnel;
pub mod group;
pub mod kpi;

pub use funnel::*;
pub use group::*;
pub use kpi::*;

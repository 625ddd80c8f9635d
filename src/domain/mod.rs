//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the raw worksheet shape (`RawTable`)
//! - cleaned per-row records (`AdRecord`)
//! - metric/dimension selectors for the group reductions (`Metric`)
//! - the ROAS tier classifier (`RoasTier`)

pub mod types;

pub use types::*;

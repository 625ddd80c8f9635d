//! Terminal reporting: run summaries and formatted dashboard sections.

pub mod format;

pub use format::*;

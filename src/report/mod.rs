//! Console reporting.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for snapshot-style tests)

pub mod format;

pub use format::*;

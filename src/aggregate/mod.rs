//! Aggregations over the sales table.
//!
//! - categorical grouping and extreme groups (`grouping`)
//! - weekly/monthly resampling (`resample`)
//! - calendar fields and quarterly totals (`calendar`)

pub mod calendar;
pub mod grouping;
pub mod resample;

pub use calendar::*;
pub use grouping::*;
pub use resample::*;

use serde::Serialize;

/// One `Group`'s values over a shared set of period labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSeries {
    pub group: String,
    pub values: Vec<f64>,
}

/// Period labels plus one aligned series per `Group` (sorted by group).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodTable {
    pub labels: Vec<String>,
    pub series: Vec<GroupSeries>,
}

impl PeriodTable {
    /// Largest single value across all series (0.0 when empty).
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

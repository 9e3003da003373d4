//! Render-ready chart data.
//!
//! Everything a chart needs is computed here, so the drawing code (ASCII or
//! Plotters) only maps numbers to cells and the data can be tested without a
//! terminal.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{
    monthly_by_group, quarterly_by_group, resample_by_group, sales_totals_by, time_profile, GroupSeries,
    PeriodTable,
};
use crate::domain::{Frequency, SalesTable};
use crate::stats;

/// Box-plot statistics for one `Group`.
///
/// Whiskers reach the most extreme observations within 1.5 IQR of the box;
/// anything beyond is an outlier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub group: String,
    pub count: usize,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Single-series line chart over categorical x labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// The 2×2 panel: weekly trend, monthly totals, quarterly totals, box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub weekly: PeriodTable,
    pub monthly: PeriodTable,
    pub quarterly: PeriodTable,
    pub boxes: Vec<BoxStats>,
}

/// All charts for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    /// Total `Sales` by `State` (labels), one series per `Group`.
    pub state_group: PeriodTable,
    /// Mean `Sales` by `Time` label.
    pub time_line: LineChart,
    pub boxes: Vec<BoxStats>,
    pub dashboard: Dashboard,
}

pub fn build_charts(table: &SalesTable) -> ChartSet {
    let boxes = group_boxes(table);
    ChartSet {
        state_group: state_group_bars(table),
        time_line: time_line(table),
        dashboard: Dashboard {
            weekly: resample_by_group(table, Frequency::Weekly),
            monthly: monthly_by_group(table),
            quarterly: quarterly_by_group(table),
            boxes: boxes.clone(),
        },
        boxes,
    }
}

/// Total `Sales` per `State`, split by `Group`. Missing pairs are 0.0.
pub fn state_group_bars(table: &SalesTable) -> PeriodTable {
    let states: Vec<String> = sales_totals_by(table, |r| r.state.as_str()).into_keys().collect();
    let groups: Vec<String> = sales_totals_by(table, |r| r.group.as_str()).into_keys().collect();

    let series = groups
        .into_iter()
        .map(|group| {
            let values: Vec<f64> = states
                .iter()
                .map(|state| {
                    table
                        .records()
                        .iter()
                        .filter(|r| &r.state == state && r.group == group)
                        .map(|r| r.sales)
                        .sum::<f64>()
                })
                .collect();
            GroupSeries { group, values }
        })
        .collect();

    PeriodTable { labels: states, series }
}

/// Intraday pattern: mean `Sales` per `Time` label, no confidence band.
pub fn time_line(table: &SalesTable) -> LineChart {
    let profile = time_profile(table);
    LineChart {
        labels: profile.iter().map(|p| p.time.clone()).collect(),
        values: profile.iter().map(|p| p.mean_sales).collect(),
    }
}

/// Box statistics per `Group`, sorted by group label.
pub fn group_boxes(table: &SalesTable) -> Vec<BoxStats> {
    let mut by_group: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in table.records() {
        by_group.entry(r.group.as_str()).or_default().push(r.sales);
    }
    by_group
        .into_iter()
        .filter_map(|(group, values)| box_stats(group, &values))
        .collect()
}

pub fn box_stats(group: &str, values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let sorted = stats::sorted_copy(values);
    let q1 = stats::quantile_sorted(&sorted, 0.25);
    let median = stats::quantile_sorted(&sorted, 0.5);
    let q3 = stats::quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let inside: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|v| (lo_fence..=hi_fence).contains(v))
        .collect();
    // The quartiles always lie inside the fences, so `inside` is non-empty.
    let lower_whisker = inside.first().copied().unwrap_or(q1);
    let upper_whisker = inside.last().copied().unwrap_or(q3);

    Some(BoxStats {
        group: group.to_string(),
        count: values.len(),
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers: sorted
            .into_iter()
            .filter(|v| !(lo_fence..=hi_fence).contains(v))
            .collect(),
    })
}

/// Upper bound for a chart's value axis with 5% headroom (1.0 if all zero).
pub fn headroom(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 { max * 1.05 } else { 1.0 }
}

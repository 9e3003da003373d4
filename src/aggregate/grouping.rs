//! Categorical aggregates: (`Group`, `State`) partitions, group totals, and
//! the intraday profile.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{time_label_key, SalesRecord, SalesTable};
use crate::stats;

/// One row of the (`Group`, `State`) aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStateAggregate {
    pub group: String,
    pub state: String,
    pub rows: usize,
    pub sales_sum: f64,
    pub sales_mean: f64,
    /// Widened so any number of `i64` counts sums without overflow.
    pub unit_sum: i128,
    pub unit_median: f64,
}

/// Total `Sales` of one `Group`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub group: String,
    pub sales: f64,
}

/// Groups with the highest and lowest total `Sales`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupExtremes {
    pub highest: GroupTotal,
    pub lowest: GroupTotal,
}

/// Mean `Sales` for one `Time` label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeAverage {
    pub time: String,
    pub rows: usize,
    pub mean_sales: f64,
}

/// Partition rows by (`Group`, `State`).
///
/// Output is sorted by group, then state.
pub fn group_by_group_state(table: &SalesTable) -> Vec<GroupStateAggregate> {
    let mut parts: BTreeMap<(&str, &str), (Vec<f64>, Vec<i64>)> = BTreeMap::new();
    for r in table.records() {
        let entry = parts.entry((r.group.as_str(), r.state.as_str())).or_default();
        entry.0.push(r.sales);
        entry.1.push(r.unit);
    }

    parts
        .into_iter()
        .map(|((group, state), (sales, units))| {
            let units_f: Vec<f64> = units.iter().map(|&u| u as f64).collect();
            GroupStateAggregate {
                group: group.to_string(),
                state: state.to_string(),
                rows: sales.len(),
                sales_sum: stats::sum(&sales),
                sales_mean: stats::mean(&sales).unwrap_or(0.0),
                unit_sum: units.iter().map(|&u| i128::from(u)).sum(),
                unit_median: stats::median(&units_f).unwrap_or(0.0),
            }
        })
        .collect()
}

/// Sum `Sales` per key, keyed and sorted by label.
pub fn sales_totals_by<F>(table: &SalesTable, key: F) -> BTreeMap<String, f64>
where
    F: Fn(&SalesRecord) -> &str,
{
    let mut totals = BTreeMap::new();
    for r in table.records() {
        *totals.entry(key(r).to_string()).or_insert(0.0) += r.sales;
    }
    totals
}

/// Total `Sales` per `Group`, sorted by label.
pub fn group_totals(table: &SalesTable) -> Vec<GroupTotal> {
    sales_totals_by(table, |r| r.group.as_str())
        .into_iter()
        .map(|(group, sales)| GroupTotal { group, sales })
        .collect()
}

/// Highest and lowest total.
///
/// Ties go to the label that sorts first, whatever order `totals` is in.
pub fn sales_extremes(totals: &[GroupTotal]) -> Option<GroupExtremes> {
    let mut ordered: Vec<&GroupTotal> = totals.iter().collect();
    ordered.sort_by(|a, b| a.group.cmp(&b.group));

    let (&first, rest) = ordered.split_first()?;
    let mut highest = first;
    let mut lowest = first;
    for &t in rest {
        if t.sales > highest.sales {
            highest = t;
        }
        if t.sales < lowest.sales {
            lowest = t;
        }
    }

    Some(GroupExtremes {
        highest: highest.clone(),
        lowest: lowest.clone(),
    })
}

/// Mean `Sales` per `Time` label in intraday order.
pub fn time_profile(table: &SalesTable) -> Vec<TimeAverage> {
    let mut acc: BTreeMap<(usize, String), Vec<f64>> = BTreeMap::new();
    for r in table.records() {
        acc.entry(time_label_key(&r.time)).or_default().push(r.sales);
    }

    acc.into_iter()
        .map(|((_, time), sales)| TimeAverage {
            time,
            rows: sales.len(),
            mean_sales: stats::mean(&sales).unwrap_or(0.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{record, table};

    #[test]
    fn group_state_partitions_are_complete() {
        let t = table(vec![
            record("2020-10-01", "Morning", "WA", "Kids", 2, 10.0),
            record("2020-10-01", "Evening", "WA", "Kids", 4, 30.0),
            record("2020-10-02", "Morning", "VIC", "Kids", 3, 5.0),
            record("2020-10-02", "Morning", "WA", "Men", 7, 12.5),
        ]);
        let rows = group_by_group_state(&t);

        let keys: Vec<(&str, &str)> = rows.iter().map(|r| (r.group.as_str(), r.state.as_str())).collect();
        assert_eq!(keys, vec![("Kids", "VIC"), ("Kids", "WA"), ("Men", "WA")]);

        let kids_wa = &rows[1];
        assert_eq!(kids_wa.rows, 2);
        assert_eq!(kids_wa.sales_sum, 40.0);
        assert_eq!(kids_wa.sales_mean, 20.0);
        assert_eq!(kids_wa.unit_sum, 6);
        assert_eq!(kids_wa.unit_median, 3.0);

        let grouped: f64 = rows.iter().map(|r| r.sales_sum).sum();
        let global: f64 = t.sales().iter().sum();
        assert!((grouped - global).abs() < 1e-9);
    }

    #[test]
    fn huge_unit_counts_sum_past_i64() {
        let t = table(vec![
            record("2020-10-01", "Morning", "WA", "Kids", 9_000_000_000_000_000_000, 1.0),
            record("2020-10-02", "Morning", "WA", "Kids", 9_000_000_000_000_000_000, 1.0),
        ]);
        let rows = group_by_group_state(&t);
        assert_eq!(rows[0].unit_sum, 18_000_000_000_000_000_000);
    }

    #[test]
    fn kids_beat_adults() {
        let t = table(vec![
            record("2020-10-01", "Morning", "WA", "Kids", 1, 60.0),
            record("2020-10-01", "Morning", "WA", "Adults", 1, 20.0),
            record("2020-10-02", "Morning", "WA", "Kids", 1, 40.0),
            record("2020-10-02", "Morning", "WA", "Adults", 1, 30.0),
        ]);
        let ext = sales_extremes(&group_totals(&t)).unwrap();
        assert_eq!(ext.highest.group, "Kids");
        assert_eq!(ext.highest.sales, 100.0);
        assert_eq!(ext.lowest.group, "Adults");
        assert_eq!(ext.lowest.sales, 50.0);
    }

    #[test]
    fn ties_resolve_to_first_label() {
        let totals = vec![
            GroupTotal { group: "Women".to_string(), sales: 10.0 },
            GroupTotal { group: "Men".to_string(), sales: 10.0 },
            GroupTotal { group: "Seniors".to_string(), sales: 5.0 },
            GroupTotal { group: "Kids".to_string(), sales: 5.0 },
        ];
        let ext = sales_extremes(&totals).unwrap();
        assert_eq!(ext.highest.group, "Men");
        assert_eq!(ext.lowest.group, "Kids");
        assert!(sales_extremes(&[]).is_none());
    }

    #[test]
    fn time_profile_uses_intraday_order() {
        let t = table(vec![
            record("2020-10-01", "Evening", "WA", "Kids", 1, 30.0),
            record("2020-10-01", "Morning", "WA", "Kids", 1, 10.0),
            record("2020-10-01", "Afternoon", "WA", "Kids", 1, 20.0),
            record("2020-10-02", "Morning", "WA", "Kids", 1, 20.0),
        ]);
        let profile = time_profile(&t);
        let labels: Vec<&str> = profile.iter().map(|p| p.time.as_str()).collect();
        assert_eq!(labels, vec!["Morning", "Afternoon", "Evening"]);
        assert_eq!(profile[0].mean_sales, 15.0);
        assert_eq!(profile[0].rows, 2);
    }
}

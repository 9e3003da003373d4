//! Calendar fields derived from `Date`, and per-`Group` period totals.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::aggregate::{resample_by_group, GroupSeries, PeriodTable};
use crate::domain::{Frequency, SalesTable, MONTH, QUARTER, WEEK};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarFields {
    /// ISO week number (1..=53).
    pub week: u32,
    pub month: u32,
    pub quarter: u32,
}

pub fn calendar_fields(date: NaiveDate) -> CalendarFields {
    let month = date.month();
    CalendarFields {
        week: date.iso_week().week(),
        month,
        quarter: (month - 1) / 3 + 1,
    }
}

/// Append `Week`, `Month` and `Quarter` columns to the table.
pub fn derive_calendar_fields(table: &mut SalesTable) -> Result<(), AppError> {
    let fields: Vec<CalendarFields> = table.records().iter().map(|r| calendar_fields(r.date)).collect();

    table.add_column(WEEK, fields.iter().map(|f| f64::from(f.week)).collect())?;
    table.add_column(MONTH, fields.iter().map(|f| f64::from(f.month)).collect())?;
    table.add_column(QUARTER, fields.iter().map(|f| f64::from(f.quarter)).collect())?;
    Ok(())
}

/// `Sales` per `Group` per calendar month.
pub fn monthly_by_group(table: &SalesTable) -> PeriodTable {
    resample_by_group(table, Frequency::Monthly)
}

/// `Sales` per `Group` per (year, quarter) present in the data.
pub fn quarterly_by_group(table: &SalesTable) -> PeriodTable {
    let quarter_of = |d: NaiveDate| (d.year(), calendar_fields(d).quarter);

    let quarters: Vec<(i32, u32)> = table
        .records()
        .iter()
        .map(|r| quarter_of(r.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let position: BTreeMap<(i32, u32), usize> = quarters.iter().enumerate().map(|(i, &q)| (q, i)).collect();

    let mut series: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in table.records() {
        let values = series
            .entry(r.group.as_str())
            .or_insert_with(|| vec![0.0; quarters.len()]);
        if let Some(&i) = position.get(&quarter_of(r.date)) {
            values[i] += r.sales;
        }
    }

    PeriodTable {
        labels: quarters.iter().map(|(y, q)| format!("{y}-Q{q}")).collect(),
        series: series
            .into_iter()
            .map(|(group, values)| GroupSeries {
                group: group.to_string(),
                values,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{date, record, table};

    #[test]
    fn fields_follow_iso_weeks() {
        let f = calendar_fields(date("2020-10-01"));
        assert_eq!(f, CalendarFields { week: 40, month: 10, quarter: 4 });

        // 2021-01-01 is a Friday: still ISO week 53 of 2020.
        let f = calendar_fields(date("2021-01-01"));
        assert_eq!((f.week, f.month, f.quarter), (53, 1, 1));

        assert_eq!(calendar_fields(date("2020-06-30")).quarter, 2);
        assert_eq!(calendar_fields(date("2020-07-01")).quarter, 3);
    }

    #[test]
    fn derived_columns_are_consistent_with_dates() {
        let mut t = table(vec![
            record("2020-10-01", "Morning", "WA", "Kids", 1, 1.0),
            record("2020-12-28", "Morning", "WA", "Kids", 1, 1.0),
        ]);
        derive_calendar_fields(&mut t).unwrap();

        assert_eq!(t.column(WEEK).unwrap(), &[40.0, 53.0]);
        assert_eq!(t.column(MONTH).unwrap(), &[10.0, 12.0]);
        assert_eq!(t.column(QUARTER).unwrap(), &[4.0, 4.0]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn quarterly_totals_by_group() {
        let t = table(vec![
            record("2020-09-30", "Morning", "WA", "Kids", 1, 4.0),
            record("2020-10-01", "Morning", "WA", "Kids", 1, 10.0),
            record("2020-12-01", "Morning", "WA", "Kids", 1, 5.0),
            record("2020-11-11", "Morning", "WA", "Men", 1, 7.0),
        ]);
        let q = quarterly_by_group(&t);
        assert_eq!(q.labels, vec!["2020-Q3", "2020-Q4"]);
        assert_eq!(q.series[0].group, "Kids");
        assert_eq!(q.series[0].values, vec![4.0, 15.0]);
        assert_eq!(q.series[1].values, vec![0.0, 7.0]);
    }
}

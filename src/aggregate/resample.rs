//! Time resampling of `Sales` into weekly and monthly buckets.
//!
//! Conventions:
//! - weekly buckets are ISO weeks (Monday..=Sunday), labelled by the Sunday
//! - monthly buckets are calendar months, labelled by their last day
//! - every bucket between the first and last populated one is emitted, so
//!   gaps show up as zero-valued buckets rather than missing entries

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::aggregate::{GroupSeries, PeriodTable};
use crate::domain::{Frequency, SalesTable};

/// Summed `Sales` for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    /// Last day of the period.
    pub end: NaiveDate,
    pub rows: usize,
    pub sales: f64,
}

/// Label (last day) of the bucket containing `date`.
pub fn bucket_end(date: NaiveDate, freq: Frequency) -> NaiveDate {
    match freq {
        Frequency::Weekly => {
            let to_sunday = 6 - date.weekday().num_days_from_monday();
            date + Days::new(u64::from(to_sunday))
        }
        Frequency::Monthly => month_end(date),
    }
}

/// Label of the bucket following the one ending at `end`.
fn next_bucket_end(end: NaiveDate, freq: Frequency) -> NaiveDate {
    match freq {
        Frequency::Weekly => end + Days::new(7),
        Frequency::Monthly => month_end(end + Days::new(1)),
    }
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Contiguous bucket labels from `first` to `last` inclusive.
fn bucket_range(first: NaiveDate, last: NaiveDate, freq: Frequency) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut cur = bucket_end(first, freq);
    let last = bucket_end(last, freq);
    while cur <= last {
        out.push(cur);
        if cur == NaiveDate::MAX {
            break;
        }
        cur = next_bucket_end(cur, freq);
    }
    out
}

fn date_span(table: &SalesTable) -> Option<(NaiveDate, NaiveDate)> {
    let first = table.records().first()?.date;
    Some(
        table
            .records()
            .iter()
            .fold((first, first), |(lo, hi), r| (lo.min(r.date), hi.max(r.date))),
    )
}

/// Sum `Sales` per bucket, gaps filled with zero.
pub fn resample(table: &SalesTable, freq: Frequency) -> Vec<Bucket> {
    let Some((first, last)) = date_span(table) else {
        return Vec::new();
    };

    let mut filled: BTreeMap<NaiveDate, (usize, f64)> = bucket_range(first, last, freq)
        .into_iter()
        .map(|end| (end, (0, 0.0)))
        .collect();
    for r in table.records() {
        let slot = filled.entry(bucket_end(r.date, freq)).or_insert((0, 0.0));
        slot.0 += 1;
        slot.1 += r.sales;
    }

    filled
        .into_iter()
        .map(|(end, (rows, sales))| Bucket { end, rows, sales })
        .collect()
}

/// Per-`Group` resampled sums over one shared, gap-filled label range.
pub fn resample_by_group(table: &SalesTable, freq: Frequency) -> PeriodTable {
    let Some((first, last)) = date_span(table) else {
        return PeriodTable::default();
    };

    let ends = bucket_range(first, last, freq);
    let position: BTreeMap<NaiveDate, usize> = ends.iter().enumerate().map(|(i, &d)| (d, i)).collect();

    let mut series: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in table.records() {
        let values = series
            .entry(r.group.as_str())
            .or_insert_with(|| vec![0.0; ends.len()]);
        if let Some(&i) = position.get(&bucket_end(r.date, freq)) {
            values[i] += r.sales;
        }
    }

    let fmt = match freq {
        Frequency::Weekly => "%Y-%m-%d",
        Frequency::Monthly => "%Y-%m",
    };
    PeriodTable {
        labels: ends.iter().map(|d| d.format(fmt).to_string()).collect(),
        series: series
            .into_iter()
            .map(|(group, values)| GroupSeries {
                group: group.to_string(),
                values,
            })
            .collect(),
    }
}

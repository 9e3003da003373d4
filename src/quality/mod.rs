//! Missing-value and structure report for the raw input table.
//!
//! Display-only: nothing downstream is gated on these counts.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::RawTable;
use crate::io::ingest::parse_date;

/// Type inferred from the present cells of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every cell is missing.
    Empty,
    Int64,
    Float64,
    Date,
    /// Free text / categorical.
    Object,
}

impl ColumnType {
    pub fn label(self) -> &'static str {
        match self {
            ColumnType::Empty => "empty",
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Date => "date",
            ColumnType::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnQuality {
    pub name: String,
    pub missing: usize,
    pub present: usize,
    pub dtype: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub row_count: usize,
    pub columns: Vec<ColumnQuality>,
    /// First and last parseable `Date`, when the column exists.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl QualityReport {
    pub fn column(&self, name: &str) -> Option<&ColumnQuality> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }
}

/// Count missing/present cells and infer a type for every column.
pub fn check_quality(raw: &RawTable) -> QualityReport {
    let columns = raw
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut missing = 0usize;
            let mut present = Vec::new();
            for cell in raw.column_cells(idx) {
                match cell {
                    Some(v) => present.push(v),
                    None => missing += 1,
                }
            }
            ColumnQuality {
                name: name.clone(),
                missing,
                present: present.len(),
                dtype: infer_type(&present),
            }
        })
        .collect();

    QualityReport {
        row_count: raw.row_count(),
        columns,
        date_range: date_span(raw, "Date"),
    }
}

fn infer_type(values: &[&str]) -> ColumnType {
    if values.is_empty() {
        return ColumnType::Empty;
    }
    if values.iter().all(|v| v.parse::<i64>().is_ok()) {
        return ColumnType::Int64;
    }
    if values.iter().all(|v| v.parse::<f64>().is_ok()) {
        return ColumnType::Float64;
    }
    if values.iter().all(|v| parse_date(v).is_ok()) {
        return ColumnType::Date;
    }
    ColumnType::Object
}

/// Earliest and latest parseable date in a column, if any.
pub fn date_span(raw: &RawTable, column: &str) -> Option<(NaiveDate, NaiveDate)> {
    let idx = raw.column_index(column)?;
    let mut dates = raw.column_cells(idx).flatten().filter_map(|v| parse_date(v).ok());
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

//! Exports of a finished run.
//!
//! - the augmented table (input columns + derived columns) as CSV
//! - the analysis summary as pretty JSON
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::aggregate::{Bucket, GroupExtremes, GroupStateAggregate, GroupTotal};
use crate::app::pipeline::RunOutput;
use crate::domain::{SalesTable, BASE_COLUMNS};
use crate::error::AppError;
use crate::quality::QualityReport;
use crate::stats::Describe;
use crate::transform::ScaleRange;

/// JSON view of a run (chart data excluded).
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub input: String,
    pub rows: usize,
    pub quality: &'a QualityReport,
    pub normalized_column: &'a str,
    pub normalized_range: &'a ScaleRange,
    pub sales: &'a Describe,
    pub unit: &'a Describe,
    pub group_state: &'a [GroupStateAggregate],
    pub group_totals: &'a [GroupTotal],
    pub extremes: &'a GroupExtremes,
    pub weekly: &'a [Bucket],
    pub monthly: &'a [Bucket],
}

impl<'a> RunSummary<'a> {
    pub fn new(run: &'a RunOutput, input: &Path) -> Self {
        Self {
            input: input.display().to_string(),
            rows: run.table.len(),
            quality: &run.quality,
            normalized_column: &run.normalized,
            normalized_range: &run.scale,
            sales: &run.sales_stats,
            unit: &run.unit_stats,
            group_state: &run.grouped,
            group_totals: &run.group_totals,
            extremes: &run.extremes,
            weekly: &run.weekly,
            monthly: &run.monthly,
        }
    }
}

/// Write the table with every derived column appended, in insertion order.
pub fn write_table_csv(path: &Path, table: &SalesTable) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::export(path, format!("cannot create file: {e}")))?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    let csv_err = |e: csv::Error| AppError::export(path, e.to_string());

    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    header.extend(table.derived_columns().iter().map(|c| c.name.as_str()));
    writer.write_record(&header).map_err(csv_err)?;

    for (i, r) in table.records().iter().enumerate() {
        let mut row = vec![
            r.date.format("%Y-%m-%d").to_string(),
            r.time.clone(),
            r.state.clone(),
            r.group.clone(),
            r.unit.to_string(),
            r.sales.to_string(),
        ];
        row.extend(table.derived_columns().iter().map(|c| c.values[i].to_string()));
        writer.write_record(&row).map_err(csv_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::export(path, format!("flush failed: {e}")))?;
    info!(path = %path.display(), rows = table.len(), "wrote table export");
    Ok(())
}

/// Write the run summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary<'_>) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::export(path, format!("cannot create file: {e}")))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary).map_err(|e| AppError::export(path, e.to_string()))?;
    writeln!(writer).map_err(|e| AppError::export(path, e.to_string()))?;
    writer
        .flush()
        .map_err(|e| AppError::export(path, format!("flush failed: {e}")))?;
    info!(path = %path.display(), "wrote summary export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{record, table};

    #[test]
    fn table_export_appends_derived_columns() {
        let mut t = table(vec![
            record("2020-10-01", "Morning", "WA", "Kids", 8, 20000.0),
            record("2020-10-02", "Evening", "VIC", "Men", 4, 10000.0),
        ]);
        t.add_column("Sales_Normalized", vec![1.0, 0.0]).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_table_csv(&path, &t).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Time,State,Group,Unit,Sales,Sales_Normalized");
        assert_eq!(lines[1], "2020-10-01,Morning,WA,Kids,8,20000,1");
        assert_eq!(lines[2], "2020-10-02,Evening,VIC,Men,4,10000,0");
    }

    #[test]
    fn export_into_missing_directory_is_export_error() {
        let t = table(vec![record("2020-10-01", "Morning", "WA", "Kids", 1, 1.0)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.csv");

        let err = write_table_csv(&path, &t).unwrap_err();
        assert!(matches!(err, AppError::Export { .. }));
        assert_eq!(err.exit_code(), 3);
    }
}

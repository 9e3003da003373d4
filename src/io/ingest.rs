//! CSV ingest and typing.
//!
//! Ingest happens in two steps:
//! - read the file into a `RawTable` (strings + missing cells), which is what
//!   the quality checker inspects
//! - type every row into a `SalesRecord`, failing the run on the first bad row
//!
//! No aggregation logic lives here.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{RawTable, SalesRecord, SalesTable, BASE_COLUMNS};
use crate::error::AppError;

/// Cell contents treated as missing values (besides the empty string).
const MISSING_TOKENS: [&str; 4] = ["na", "n/a", "nan", "null"];

/// Both views of the input file.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub raw: RawTable,
    pub table: SalesTable,
}

/// Load a CSV and type it into the Sales Record Table.
pub fn load_sales_table(path: &Path) -> Result<LoadedData, AppError> {
    let raw = load_raw_table(path)?;
    let table = sales_table_from_raw(&raw, path)?;
    info!(rows = table.len(), path = %path.display(), "loaded sales table");
    Ok(LoadedData { raw, table })
}

/// Read a CSV file into an untyped table.
pub fn load_raw_table(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path).map_err(|e| AppError::data_load(path, format!("cannot open file: {e}")))?;
    read_raw_table(file, path)
}

/// Read CSV from any reader. `path` is only used in error messages.
pub fn read_raw_table<R: Read>(reader: R, path: &Path) -> Result<RawTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::data_load(path, format!("cannot read CSV headers: {e}")))?
        .iter()
        .map(normalize_header_name)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(AppError::data_load(path, "file has no header row"));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::data_load(path, format!("CSV parse error on line {line}: {e}")))?;
        rows.push(record_cells(&record, headers.len()));
    }

    if rows.is_empty() {
        return Err(AppError::data_load(path, "file contains no data rows"));
    }

    debug!(columns = headers.len(), rows = rows.len(), "read raw CSV");
    Ok(RawTable { headers, rows })
}

/// Type every raw row. Any missing or unparseable base field aborts the load.
pub fn sales_table_from_raw(raw: &RawTable, path: &Path) -> Result<SalesTable, AppError> {
    if raw.rows.is_empty() {
        return Err(AppError::data_load(path, "file contains no data rows"));
    }

    let mut idx = [0usize; 6];
    for (slot, name) in idx.iter_mut().zip(BASE_COLUMNS) {
        *slot = raw
            .column_index(name)
            .ok_or_else(|| AppError::column_not_found(name))?;
    }
    let [date_idx, time_idx, state_idx, group_idx, unit_idx, sales_idx] = idx;

    let mut records = Vec::with_capacity(raw.rows.len());
    for (i, row) in raw.rows.iter().enumerate() {
        let line = i + 2;
        let invalid = |name: &str, e: String| AppError::data_load(path, format!("line {line}: invalid `{name}`: {e}"));

        let date = parse_date(get_required(row, date_idx, "Date", line, path)?).map_err(|e| invalid("Date", e))?;
        let unit = parse_unit(get_required(row, unit_idx, "Unit", line, path)?).map_err(|e| invalid("Unit", e))?;
        let sales = parse_sales(get_required(row, sales_idx, "Sales", line, path)?).map_err(|e| invalid("Sales", e))?;

        records.push(SalesRecord {
            date,
            time: get_required(row, time_idx, "Time", line, path)?.to_string(),
            state: get_required(row, state_idx, "State", line, path)?.to_string(),
            group: get_required(row, group_idx, "Group", line, path)?.to_string(),
            unit,
            sales,
        });
    }

    Ok(SalesTable::new(records))
}

fn get_required<'a>(
    row: &'a [Option<String>],
    idx: usize,
    name: &str,
    line: usize,
    path: &Path,
) -> Result<&'a str, AppError> {
    row.get(idx)
        .and_then(|c| c.as_deref())
        .ok_or_else(|| AppError::data_load(path, format!("line {line}: missing value for `{name}`")))
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn record_cells(record: &StringRecord, width: usize) -> Vec<Option<String>> {
    let mut cells: Vec<Option<String>> = record.iter().map(parse_cell).collect();
    if cells.len() < width {
        cells.resize(width, None);
    }
    cells
}

fn parse_cell(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() || MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t)) {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parse a date in one of the accepted formats (first match wins).
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // The apparel exports use `1-Oct-2020`; ISO and the common slash/dash
    // variants are accepted as well.
    const FMTS: [&str; 6] = ["%d-%b-%Y", "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "'{s}' is not a date. Expected one of: D-Mon-YYYY, YYYY-MM-DD, DD/MM/YYYY, MM/DD/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

fn parse_unit(s: &str) -> Result<i64, String> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("'{s}' is not an integer count")),
    }
}

fn parse_sales(s: &str) -> Result<f64, String> {
    let s = s.trim();
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("'{s}' is not a finite number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(csv: &str) -> Result<RawTable, AppError> {
        read_raw_table(csv.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn parses_apparel_export_layout() {
        let csv = "\u{feff}Date,Time,State,Group,Unit,Sales\n\
                   1-Oct-2020, Morning, WA, Kids,8,20000\n\
                   1-Oct-2020, Morning, WA, Men,8,20000\n";
        let raw = read(csv).unwrap();
        assert_eq!(raw.headers, vec!["Date", "Time", "State", "Group", "Unit", "Sales"]);

        let table = sales_table_from_raw(&raw, Path::new("test.csv")).unwrap();
        assert_eq!(table.len(), 2);
        let first = &table.records()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2020, 10, 1).unwrap());
        assert_eq!(first.state, "WA");
        assert_eq!(first.group, "Kids");
        assert_eq!(first.unit, 8);
        assert!((first.sales - 20000.0).abs() < 1e-9);
    }

    #[test]
    fn missing_tokens_become_none() {
        let raw = read("A,B,C\n1,,NA\n2,x\n").unwrap();
        assert_eq!(raw.rows[0], vec![Some("1".to_string()), None, None]);
        // Short records are padded.
        assert_eq!(raw.rows[1], vec![Some("2".to_string()), Some("x".to_string()), None]);
    }

    #[test]
    fn header_only_is_data_load_error() {
        let err = read("Date,Time,State,Group,Unit,Sales\n").unwrap_err();
        assert!(matches!(err, AppError::DataLoad { .. }));
    }

    #[test]
    fn absent_base_column_is_column_not_found() {
        let raw = read("Date,Time,State,Group,Unit\n1-Oct-2020,Morning,WA,Kids,8\n").unwrap();
        let err = sales_table_from_raw(&raw, Path::new("test.csv")).unwrap_err();
        match err {
            AppError::ColumnNotFound { column } => assert_eq!(column, "Sales"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_row_names_line_and_column() {
        let raw = read("Date,Time,State,Group,Unit,Sales\n1-Oct-2020,Morning,WA,Kids,8,abc\n").unwrap();
        let err = sales_table_from_raw(&raw, Path::new("test.csv")).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, AppError::DataLoad { .. }));
        assert!(msg.contains("line 2"), "{msg}");
        assert!(msg.contains("`Sales`"), "{msg}");
    }

    #[test]
    fn missing_base_value_is_data_load_error() {
        let raw = read("Date,Time,State,Group,Unit,Sales\n1-Oct-2020,,WA,Kids,8,10\n").unwrap();
        let err = sales_table_from_raw(&raw, Path::new("test.csv")).unwrap_err();
        assert!(err.to_string().contains("`Time`"));
    }

    #[test]
    fn date_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 12, 30).unwrap();
        for s in ["30-Dec-2020", "2020-12-30", "30/12/2020", "2020/12/30"] {
            assert_eq!(parse_date(s).unwrap(), expected, "{s}");
        }
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn unit_accepts_integral_floats_only() {
        assert_eq!(parse_unit("8").unwrap(), 8);
        assert_eq!(parse_unit("8.0").unwrap(), 8);
        assert!(parse_unit("8.5").is_err());
        assert!(parse_sales("inf").is_err());
    }
}

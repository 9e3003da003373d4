//! Shared domain types.
//!
//! The sales table is created once at load time and only ever grows new
//! columns; rows are never inserted or removed after ingest.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Base columns every input file must carry.
pub const BASE_COLUMNS: [&str; 6] = ["Date", "Time", "State", "Group", "Unit", "Sales"];

/// Name of the column appended by the normalizer for the default `Sales` source.
pub const SALES_NORMALIZED: &str = "Sales_Normalized";

/// Name of the normalized counterpart of `column`: `{column}_Normalized`.
///
/// Base columns are matched case-insensitively and keep their canonical
/// spelling, so `unit` and `Unit` both give `Unit_Normalized`.
pub fn normalized_column_name(column: &str) -> String {
    let column = column.trim();
    let source = BASE_COLUMNS
        .iter()
        .find(|c| c.eq_ignore_ascii_case(column))
        .copied()
        .unwrap_or(column);
    format!("{source}_Normalized")
}

/// Calendar columns appended by `aggregate::derive_calendar_fields`.
pub const WEEK: &str = "Week";
pub const MONTH: &str = "Month";
pub const QUARTER: &str = "Quarter";

/// Canonical intraday order for `Time` labels. Unknown labels sort after these.
pub const TIME_OF_DAY_ORDER: [&str; 4] = ["Morning", "Afternoon", "Evening", "Night"];

/// The CSV as read from disk: headers plus string cells, `None` for missing.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Case-insensitive header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name.trim()))
    }

    /// Cells of one column in row order (`None` for missing cells).
    pub fn column_cells(&self, idx: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(idx).and_then(|c| c.as_deref()))
    }
}

/// One typed row of the sales dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    /// Time-of-day label (e.g. `Morning`).
    pub time: String,
    pub state: String,
    /// Product category (e.g. `Kids`).
    pub group: String,
    pub unit: i64,
    pub sales: f64,
}

/// A numeric column appended after load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// The Sales Record Table.
#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    records: Vec<SalesRecord>,
    derived: Vec<DerivedColumn>,
}

impl SalesTable {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self {
            records,
            derived: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Appended columns in insertion order.
    pub fn derived_columns(&self) -> &[DerivedColumn] {
        &self.derived
    }

    pub fn sales(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.sales).collect()
    }

    pub fn units(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.unit as f64).collect()
    }

    /// Look up a derived column by exact name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.derived
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Values of any numeric column: `Sales`, `Unit`, or a derived column.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, AppError> {
        if name.eq_ignore_ascii_case("Sales") {
            return Ok(self.sales());
        }
        if name.eq_ignore_ascii_case("Unit") {
            return Ok(self.units());
        }
        self.column(name)
            .map(<[f64]>::to_vec)
            .ok_or_else(|| AppError::column_not_found(name))
    }

    /// Append a column, replacing an existing one with the same name.
    pub fn add_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), AppError> {
        if values.len() != self.records.len() {
            return Err(AppError::InvalidInput(format!(
                "Column `{name}` has {} values but the table has {} rows.",
                values.len(),
                self.records.len()
            )));
        }
        if BASE_COLUMNS.iter().any(|c| c.eq_ignore_ascii_case(name)) {
            return Err(AppError::InvalidInput(format!(
                "Cannot overwrite base column `{name}`."
            )));
        }

        match self.derived.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.derived.push(DerivedColumn {
                name: name.to_string(),
                values,
            }),
        }
        Ok(())
    }
}

/// Resampling bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// ISO weeks (Monday–Sunday), labelled by the Sunday.
    Weekly,
    /// Calendar months, labelled by the last day of the month.
    Monthly,
}

impl Frequency {
    pub fn display_name(self) -> &'static str {
        match self {
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

/// Sort key placing known time-of-day labels first, in intraday order.
pub fn time_label_key(label: &str) -> (usize, String) {
    let rank = TIME_OF_DAY_ORDER
        .iter()
        .position(|t| t.eq_ignore_ascii_case(label))
        .unwrap_or(TIME_OF_DAY_ORDER.len());
    (rank, label.to_string())
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, the environment, and defaults.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub csv_path: PathBuf,
    /// Numeric column rescaled into `Sales_Normalized`.
    pub normalize_column: String,
    /// Rows shown in the "head" previews.
    pub head_rows: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_table: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,
}

impl AnalysisConfig {
    pub fn for_path(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            normalize_column: "Sales".to_string(),
            head_rows: 5,
            plot: false,
            plot_width: 72,
            plot_height: 16,
            export_table: None,
            export_summary: None,
        }
    }
}

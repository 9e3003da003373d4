//! Shared analysis pipeline used by both the report and the chart viewer.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> quality check -> normalize -> aggregate -> chart data
//!
//! The front-ends can then focus on presentation (printing vs widgets).

use tracing::{info, info_span};

use crate::aggregate::{
    derive_calendar_fields, group_by_group_state, group_totals, resample, sales_extremes, Bucket, GroupExtremes,
    GroupStateAggregate, GroupTotal,
};
use crate::charts::{build_charts, ChartSet};
use crate::domain::{normalized_column_name, AnalysisConfig, Frequency, SalesTable};
use crate::error::AppError;
use crate::io::ingest::{load_sales_table, LoadedData};
use crate::quality::{check_quality, QualityReport};
use crate::stats::{describe, Describe};
use crate::transform::{normalize_column, ScaleRange};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub quality: QualityReport,
    /// The table with `{column}_Normalized`, `Week`, `Month` and `Quarter` appended.
    pub table: SalesTable,
    /// Name of the appended normalized column.
    pub normalized: String,
    pub scale: ScaleRange,
    pub grouped: Vec<GroupStateAggregate>,
    pub sales_stats: Describe,
    pub unit_stats: Describe,
    pub group_totals: Vec<GroupTotal>,
    pub extremes: GroupExtremes,
    pub weekly: Vec<Bucket>,
    pub monthly: Vec<Bucket>,
    pub charts: ChartSet,
}

/// Load the configured CSV and run the full pipeline.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let loaded = {
        let _span = info_span!("load", path = %config.csv_path.display()).entered();
        load_sales_table(&config.csv_path)?
    };
    analyze(loaded, config)
}

/// Run the pipeline on already-loaded data.
pub fn analyze(loaded: LoadedData, config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let LoadedData { raw, mut table } = loaded;

    // 1) Quality report on the raw cells.
    let quality = check_quality(&raw);
    info!(
        rows = quality.row_count,
        missing = quality.total_missing(),
        "quality check done"
    );

    // 2) Min-max scale the configured column.
    let normalized = normalized_column_name(&config.normalize_column);
    let scale = normalize_column(&mut table, &config.normalize_column, &normalized)?;
    info!(column = %config.normalize_column, target = %normalized, min = scale.min, max = scale.max, "normalized");

    // 3) Aggregates.
    derive_calendar_fields(&mut table)?;
    let grouped = group_by_group_state(&table);
    let sales_stats = describe(&table.sales()).ok_or_else(|| empty_table("Sales"))?;
    let unit_stats = describe(&table.units()).ok_or_else(|| empty_table("Unit"))?;
    let group_totals = group_totals(&table);
    let extremes = sales_extremes(&group_totals).ok_or_else(|| empty_table("Group"))?;
    let weekly = resample(&table, Frequency::Weekly);
    let monthly = resample(&table, Frequency::Monthly);
    info!(
        partitions = grouped.len(),
        weeks = weekly.len(),
        months = monthly.len(),
        highest = %extremes.highest.group,
        lowest = %extremes.lowest.group,
        "aggregated"
    );

    // 4) Chart data.
    let charts = build_charts(&table);

    Ok(RunOutput {
        quality,
        table,
        normalized,
        scale,
        grouped,
        sales_stats,
        unit_stats,
        group_totals,
        extremes,
        weekly,
        monthly,
        charts,
    })
}

fn empty_table(column: &str) -> AppError {
    AppError::InvalidInput(format!("Cannot summarize `{column}`: the table has no rows."))
}

//! Text formatting for the run report.

use crate::aggregate::{Bucket, GroupExtremes, GroupStateAggregate};
use crate::app::pipeline::RunOutput;
use crate::domain::{AnalysisConfig, Frequency, SalesTable};
use crate::quality::QualityReport;
use crate::stats::Describe;

/// Format the full report, section by section.
pub fn format_run_summary(run: &RunOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== sales - Apparel Sales Analysis ===\n");
    out.push_str(&format!("Input: {}\n\n", config.csv_path.display()));

    out.push_str(&format_missing_values(&run.quality));
    out.push('\n');
    out.push_str(&format_overview(&run.quality));
    out.push('\n');
    out.push_str(&format_normalized_head(&run.table, &run.normalized, config.head_rows));
    out.push('\n');
    out.push_str(&format_grouped_head(&run.grouped, config.head_rows));
    out.push('\n');
    out.push_str(&format_describe("Sales Statistics", &run.sales_stats));
    out.push('\n');
    out.push_str(&format_describe("Units Statistics", &run.unit_stats));
    out.push('\n');
    out.push_str(&format_extremes(&run.extremes));
    out.push('\n');
    out.push_str(&format_buckets(&bucket_title(Frequency::Weekly), &run.weekly));
    out.push('\n');
    out.push_str(&format_buckets(&bucket_title(Frequency::Monthly), &run.monthly));

    out
}

pub fn format_missing_values(report: &QualityReport) -> String {
    let mut out = String::from("Missing Values:\n");
    let width = name_width(report);
    for c in &report.columns {
        out.push_str(&format!("{:<width$} {:>8}\n", c.name, c.missing));
    }
    out
}

/// Column names, non-null counts, inferred types, and row count.
pub fn format_overview(report: &QualityReport) -> String {
    let width = name_width(report);
    let mut out = String::from("Data Overview:\n");
    out.push_str(&format!(
        "Rows: {} | Columns: {}\n",
        report.row_count,
        report.columns.len()
    ));
    if let Some((first, last)) = report.date_range {
        out.push_str(&format!("Dates: {first} to {last}\n"));
    }
    out.push_str(&format!(" #  {:<width$} {:>14}  {}\n", "Column", "Non-Null Count", "Dtype"));
    out.push_str(&format!("--- {:-<width$} {:-<14}  {:-<7}\n", "", "", ""));
    for (i, c) in report.columns.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}  {:<width$} {:>14}  {}\n",
            i,
            c.name,
            format!("{} non-null", c.present),
            c.dtype.label()
        ));
    }
    out
}

/// Source values next to their normalized column (`target` is `{source}_Normalized`).
pub fn format_normalized_head(table: &SalesTable, target: &str, n: usize) -> String {
    let source = target.strip_suffix("_Normalized").unwrap_or(target);
    let mut out = format!("Normalized {source} Data:\n");
    out.push_str(&format!("{:>4} {:>12} {:>18}\n", "", source, target));
    let values = table.numeric_column(source).unwrap_or_default();
    let normalized = table.column(target).unwrap_or(&[]);
    for i in 0..table.len().min(n) {
        let value = values.get(i).map(|&v| fmt_num(v)).unwrap_or_else(|| "-".to_string());
        let scaled = normalized
            .get(i)
            .map(|v| format!("{v:.6}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{i:>4} {value:>12} {scaled:>18}\n"));
    }
    out
}

pub fn format_grouped_head(rows: &[GroupStateAggregate], n: usize) -> String {
    let mut out = String::from("Grouped Data Analysis:\n");
    out.push_str(&format!(
        "{:<10} {:<6} {:>14} {:>12} {:>10} {:>11}\n",
        "Group", "State", "Sales sum", "Sales mean", "Unit sum", "Unit median"
    ));
    for r in rows.iter().take(n) {
        out.push_str(&format!(
            "{:<10} {:<6} {:>14} {:>12.2} {:>10} {:>11.1}\n",
            truncate(&r.group, 10),
            truncate(&r.state, 6),
            fmt_num(r.sales_sum),
            r.sales_mean,
            r.unit_sum,
            r.unit_median
        ));
    }
    out
}

pub fn format_describe(title: &str, d: &Describe) -> String {
    let mut out = format!("{title}:\n");
    let rows = [
        ("count", d.count as f64),
        ("mean", d.mean),
        ("std", d.std),
        ("min", d.min),
        ("25%", d.q25),
        ("50%", d.median),
        ("75%", d.q75),
        ("max", d.max),
    ];
    for (label, value) in rows {
        out.push_str(&format!("{label:<6} {value:>16.6}\n"));
    }
    out
}

pub fn format_extremes(ext: &GroupExtremes) -> String {
    format!(
        "Highest Sales Group: {} ({})\nLowest Sales Group: {} ({})\n",
        ext.highest.group,
        fmt_num(ext.highest.sales),
        ext.lowest.group,
        fmt_num(ext.lowest.sales)
    )
}

pub fn format_buckets(title: &str, buckets: &[Bucket]) -> String {
    let mut out = format!("{title}:\n");
    for b in buckets {
        out.push_str(&format!("{} {:>14}\n", b.end, fmt_num(b.sales)));
    }
    out
}

fn bucket_title(freq: Frequency) -> String {
    format!("{} Sales", freq.display_name())
}

fn name_width(report: &QualityReport) -> usize {
    report
        .columns
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(6)
}

/// Whole numbers print without decimals, everything else with two.
fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

//! Column transforms applied to the sales table.

use serde::Serialize;
use tracing::warn;

use crate::domain::SalesTable;
use crate::error::AppError;

/// Min/max observed when scaling a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    pub fn of(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let (min, max) = values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(Self { min, max })
    }

    /// `max == min`: every scaled value is defined as 0.0.
    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    /// Works on halves so `max - min` stays finite for any finite range.
    pub fn scale(&self, v: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let span = self.max / 2.0 - self.min / 2.0;
        ((v / 2.0 - self.min / 2.0) / span).clamp(0.0, 1.0)
    }
}

/// Min-max scale values into [0, 1].
///
/// The column minimum maps to 0 and the maximum to 1. A constant column maps
/// to all zeros.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let Some(range) = ScaleRange::of(values) else {
        return Vec::new();
    };
    values.iter().map(|&v| range.scale(v)).collect()
}

/// Normalize `column` and store the result as `target`.
pub fn normalize_column(table: &mut SalesTable, column: &str, target: &str) -> Result<ScaleRange, AppError> {
    let values = table.numeric_column(column)?;
    let range = ScaleRange::of(&values).ok_or_else(|| {
        AppError::InvalidInput(format!("Cannot normalize `{column}`: the table has no rows."))
    })?;
    if range.is_degenerate() {
        warn!(column, value = range.min, "constant column; normalized values are all 0.0");
    }

    let scaled = values.iter().map(|&v| range.scale(v)).collect();
    table.add_column(target, scaled)?;
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{SalesRecord, SALES_NORMALIZED};

    fn table(sales: &[f64]) -> SalesTable {
        let date = NaiveDate::from_ymd_opt(2020, 10, 1).unwrap();
        SalesTable::new(
            sales
                .iter()
                .map(|&s| SalesRecord {
                    date,
                    time: "Morning".to_string(),
                    state: "WA".to_string(),
                    group: "Kids".to_string(),
                    unit: 1,
                    sales: s,
                })
                .collect(),
        )
    }

    #[test]
    fn four_values_scale_to_thirds() {
        let out = min_max_normalize(&[10.0, 20.0, 30.0, 40.0]);
        let expected = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0];
        for (got, want) in out.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
        assert!((out[1] - 0.333).abs() < 1e-3);
        assert!((out[2] - 0.667).abs() < 1e-3);
    }

    #[test]
    fn constant_column_is_all_zero() {
        assert_eq!(min_max_normalize(&[5.0, 5.0, 5.0]), vec![0.0, 0.0, 0.0]);
        assert!(min_max_normalize(&[]).is_empty());
    }

    #[test]
    fn extremes_map_to_bounds_regardless_of_order() {
        let values = [37.5, -2.0, 110.25, 4.0, 110.25];
        let out = min_max_normalize(&values);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], 1.0);
        assert_eq!(out[4], 1.0);
    }

    #[test]
    fn widest_finite_range_still_spans_unit_interval() {
        let out = min_max_normalize(&[-1.0e308, 0.0, 1.0e308]);
        assert_eq!(out, vec![0.0, 0.5, 1.0]);

        let out = min_max_normalize(&[f64::MIN, f64::MAX]);
        assert_eq!(out, vec![0.0, 1.0]);
    }

    #[test]
    fn normalize_column_appends_and_is_idempotent() {
        let mut t = table(&[10.0, 20.0, 30.0, 40.0]);
        let range = normalize_column(&mut t, "Sales", SALES_NORMALIZED).unwrap();
        assert_eq!(range, ScaleRange { min: 10.0, max: 40.0 });
        let first = t.column(SALES_NORMALIZED).unwrap().to_vec();

        normalize_column(&mut t, "Sales", SALES_NORMALIZED).unwrap();
        assert_eq!(t.derived_columns().len(), 1);
        assert_eq!(t.column(SALES_NORMALIZED).unwrap(), first.as_slice());
    }

    #[test]
    fn normalize_unknown_column_fails() {
        let mut t = table(&[1.0]);
        let err = normalize_column(&mut t, "Profit", "Profit_Normalized").unwrap_err();
        assert!(matches!(err, AppError::ColumnNotFound { .. }));
    }
}

//! Descriptive statistics over numeric columns.
//!
//! Quantiles use linear interpolation between closest ranks, and the standard
//! deviation is the sample (n - 1) estimator.

use serde::Serialize;

/// count / mean / std / min / quartiles / max summary of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Summarize a column. Returns `None` for empty input.
pub fn describe(values: &[f64]) -> Option<Describe> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    Some(Describe {
        count: values.len(),
        mean: mean(values)?,
        std: sample_std(values).unwrap_or(f64::NAN),
        min: sorted[0],
        q25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(sum(values) / values.len() as f64)
}

/// Sample standard deviation; `None` with fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() as f64 - 1.0)).sqrt())
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Linear-interpolation quantile, `q` in [0, 1].
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(quantile_sorted(&sorted_copy(values), q))
}

/// Quantile of already-sorted, non-empty input.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (n as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    if frac == 0.0 {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn describe_matches_hand_computed_values() {
        let d = describe(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert_eq!(d.count, 4);
        assert!(close(d.mean, 25.0));
        // sqrt(500 / 3)
        assert!(close(d.std, 12.909944487358056));
        assert!(close(d.min, 10.0));
        assert!(close(d.q25, 17.5));
        assert!(close(d.median, 25.0));
        assert!(close(d.q75, 32.5));
        assert!(close(d.max, 40.0));
    }

    #[test]
    fn describe_single_value_has_nan_std() {
        let d = describe(&[7.0]).unwrap();
        assert!(d.std.is_nan());
        assert!(close(d.median, 7.0));
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn median_of_odd_and_even_counts() {
        assert!(close(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0));
        assert!(close(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5));
        assert!(median(&[]).is_none());
    }
}

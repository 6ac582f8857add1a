//! Descriptive statistics that skip missing values.
//!
//! Every function here treats `NaN` as missing and excludes it. A sample with
//! no remaining values is an error: there is no sensible statistic to return.

use cellframe_core::{CellframeError, Result};

/// Arithmetic mean of the non-missing values.
pub fn mean(data: &[f64]) -> Result<f64> {
    let values = present(data, "mean")?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of the non-missing values.
pub fn median(data: &[f64]) -> Result<f64> {
    let mut sorted = present(data, "median")?;
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(compute_quantile_sorted(&sorted, 0.5))
}

/// Minimum and maximum of the non-missing values.
pub fn min_max(data: &[f64]) -> Result<(f64, f64)> {
    let values = present(data, "min_max")?;
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &x in &values {
        lo = lo.min(x);
        hi = hi.max(x);
    }
    Ok((lo, hi))
}

// ── Internal ───────────────────────────────────────────────────────────────

fn present(data: &[f64], what: &str) -> Result<Vec<f64>> {
    let values: Vec<f64> = data.iter().copied().filter(|x| !x.is_nan()).collect();
    if values.is_empty() {
        return Err(CellframeError::InvalidInput(format!(
            "{what}: data has no non-missing values"
        )));
    }
    Ok(values)
}

/// Compute a quantile from a pre-sorted slice using linear interpolation.
fn compute_quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = lo + 1;
    let frac = pos - lo as f64;
    if hi >= n {
        sorted[n - 1]
    } else {
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

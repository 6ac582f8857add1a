//! Rounded scale breaks.

use cellframe_core::{CellframeError, Result};

/// Up to `steps` evenly spaced, rounded values from `start` towards `stop`.
///
/// The spacing is rounded to a precision derived from the width of the range,
/// one digit finer than the range itself for sub-unit ranges, so breaks read
/// well on a legend. Rounding is half-to-even. Values that collapse onto the
/// same number after rounding are kept once; the result is sorted. Because of
/// the rounding the last break may fall short of `stop`.
///
/// `start == stop` yields `[start]`.
///
/// # Errors
///
/// `InvalidInput` for non-finite bounds, `stop < start`, or fewer than two
/// steps on a non-empty range.
pub fn range_inclusive(start: f64, stop: f64, steps: usize) -> Result<Vec<f64>> {
    if !start.is_finite() || !stop.is_finite() {
        return Err(CellframeError::InvalidInput(format!(
            "range bounds must be finite, got {start}..={stop}"
        )));
    }
    let width = stop - start;
    if width == 0.0 {
        return Ok(vec![start]);
    }
    if width < 0.0 {
        return Err(CellframeError::InvalidInput(format!(
            "range stop {stop} is below start {start}"
        )));
    }
    if steps < 2 {
        return Err(CellframeError::InvalidInput(format!(
            "a range needs at least 2 steps, got {steps}"
        )));
    }

    let decimals = if width < 1.0 {
        1 - width.log10().round_ties_even() as i32
    } else {
        0
    };
    let width = round_to(width, decimals);
    let increment = round_to(width / (steps - 1) as f64, decimals + 1);

    let mut breaks: Vec<f64> = (0..steps)
        .map(|i| round_to(start + increment * i as f64, decimals + 2))
        .collect();
    breaks.sort_by(|a, b| a.total_cmp(b));
    breaks.dedup();
    Ok(breaks)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

//! Midpoints for diverging color scales.
//!
//! A diverging scale needs one data value to sit at its neutral color.
//! [`midpoint`] derives it from a column (mean, median, or midrange) or passes
//! a caller-supplied value through unchanged.

use std::fmt;
use std::str::FromStr;

use cellframe_core::{CellframeError, Result};
use cellframe_omics::ColumnData;

use crate::descriptive;

/// How to place the midpoint of a diverging color scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Midpoint {
    /// Arithmetic mean of the data.
    Mean,
    /// Median of the data.
    #[default]
    Median,
    /// `(max + min) / 2`.
    Mid,
    /// A fixed value, returned as is.
    Value(f64),
}

impl FromStr for Midpoint {
    type Err = CellframeError;

    /// Parses `"mean"`, `"median"`, `"mid"`, or a number.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "mean" => Ok(Midpoint::Mean),
            "median" => Ok(Midpoint::Median),
            "mid" => Ok(Midpoint::Mid),
            other => other.parse::<f64>().map(Midpoint::Value).map_err(|_| {
                CellframeError::InvalidInput(format!(
                    "expected 'mean', 'median', 'mid' or a number for the midpoint, got '{other}'"
                ))
            }),
        }
    }
}

impl fmt::Display for Midpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Midpoint::Mean => f.write_str("mean"),
            Midpoint::Median => f.write_str("median"),
            Midpoint::Mid => f.write_str("mid"),
            Midpoint::Value(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for Midpoint {
    fn from(value: f64) -> Self {
        Midpoint::Value(value)
    }
}

/// Midpoint of `values` under `mode`. `NaN` entries are skipped.
///
/// # Errors
///
/// `InvalidInput` when a data-driven mode finds no non-missing values.
pub fn midpoint(values: &[f64], mode: Midpoint) -> Result<f64> {
    match mode {
        Midpoint::Value(v) => Ok(v),
        Midpoint::Mean => descriptive::mean(values),
        Midpoint::Median => descriptive::median(values),
        Midpoint::Mid => {
            let (lo, hi) = descriptive::min_max(values)?;
            Ok((hi + lo) / 2.0)
        }
    }
}

/// Midpoint of a frame column.
///
/// # Errors
///
/// `Type` for string and categorical columns, otherwise as [`midpoint`].
pub fn column_midpoint(column: &ColumnData, mode: Midpoint) -> Result<f64> {
    if let Midpoint::Value(v) = mode {
        return Ok(v);
    }
    let values = column.to_f64().ok_or_else(|| {
        CellframeError::Type(format!(
            "cannot compute a midpoint of a {:?} column",
            column.dtype()
        ))
    })?;
    midpoint(&values, mode)
}

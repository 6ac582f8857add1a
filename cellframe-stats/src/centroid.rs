//! Per-group label positions for on-data legends.

use cellframe_core::{CellframeError, Result};
use cellframe_omics::{ColumnData, Frame, FrameBuilder};
use log::debug;

use crate::aggregate::Grouping;

/// Centroid of each group of `group_by` in the `(x, y)` plane.
///
/// Unweighted, the centroid is the mean position. Weighted, each point counts
/// with `1 / sqrt(d)`, `d` being its distance to the group mean, which pulls
/// the label towards dense regions of the group. A point lying exactly on the
/// group mean has infinite weight; when there are any, the centroid is their
/// mean, i.e. the group mean itself.
///
/// Rows with a `NaN` coordinate are skipped. The result has columns
/// `group_by`, `x`, `y` and one row per group, in group order.
///
/// # Errors
///
/// `KeyNotFound` for a missing column, `Type` for non-numeric coordinates.
pub fn group_centroids(
    frame: &Frame,
    x: &str,
    y: &str,
    group_by: &str,
    weighted: bool,
) -> Result<Frame> {
    let xs = coordinates(frame, x)?;
    let ys = coordinates(frame, y)?;
    let groups = frame.require(group_by)?;
    let grouping = Grouping::of(groups);
    debug!(
        "{} centroids of {} group(s) of '{}'",
        if weighted { "weighted" } else { "plain" },
        grouping.len(),
        group_by
    );

    let mut representatives = Vec::with_capacity(grouping.len());
    let mut cx = Vec::with_capacity(grouping.len());
    let mut cy = Vec::with_capacity(grouping.len());
    for (_, rows) in grouping.iter() {
        let points: Vec<(f64, f64)> = rows
            .iter()
            .map(|&i| (xs[i], ys[i]))
            .filter(|(a, b)| !a.is_nan() && !b.is_nan())
            .collect();
        if points.is_empty() {
            continue;
        }
        let (px, py) = if weighted {
            weighted_centroid(&points)
        } else {
            mean_point(&points)
        };
        representatives.push(rows[0]);
        cx.push(px);
        cy.push(py);
    }

    let mut builder = FrameBuilder::default();
    builder.push(group_by, groups.subset(&representatives))?;
    for (name, data) in [(x, cx), (y, cy)] {
        if !builder.push(name, ColumnData::Numeric(data))? {
            return Err(CellframeError::InvalidInput(format!(
                "column '{name}' is used twice"
            )));
        }
    }
    Ok(builder.finish())
}

fn coordinates(frame: &Frame, name: &str) -> Result<Vec<f64>> {
    let column = frame.require(name)?;
    match column {
        ColumnData::Numeric(_) | ColumnData::Float32(_) => column.to_f64().ok_or_else(|| {
            CellframeError::Type(format!("coordinate column '{name}' is not numeric"))
        }),
        other => Err(CellframeError::Type(format!(
            "coordinate column '{name}' is {:?}, expected numeric",
            other.dtype()
        ))),
    }
}

fn mean_point(points: &[(f64, f64)]) -> (f64, f64) {
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
    (sx / n, sy / n)
}

fn weighted_centroid(points: &[(f64, f64)]) -> (f64, f64) {
    let (mx, my) = mean_point(points);
    let distances: Vec<f64> = points
        .iter()
        .map(|&(x, y)| ((x - mx).powi(2) + (y - my).powi(2)).sqrt())
        .collect();

    let on_mean: Vec<(f64, f64)> = points
        .iter()
        .zip(&distances)
        .filter(|&(_, &d)| d == 0.0)
        .map(|(&p, _)| p)
        .collect();
    if !on_mean.is_empty() {
        return mean_point(&on_mean);
    }

    let (mut wx, mut wy, mut total) = (0.0, 0.0, 0.0);
    for (&(x, y), &d) in points.iter().zip(&distances) {
        let w = 1.0 / d.sqrt();
        wx += w * x;
        wy += w * y;
        total += w;
    }
    (wx / total, wy / total)
}

//! Summary statistics over cellframe frames.
//!
//! - **Aggregation** — [`aggregate`] reduces value columns to per-group mean,
//!   sum and percentage-above-threshold; [`dotplot_frame`] goes straight from
//!   a dataset to the dot plot table
//! - **Midpoints** — [`midpoint`] places the neutral color of a diverging scale
//! - **Centroids** — [`group_centroids`] positions on-data legend labels
//! - **Breaks** — [`range_inclusive`] produces rounded legend breaks
//!
//! # Example
//!
//! ```
//! use cellframe_omics::{ColumnData, Frame};
//! use cellframe_stats::{aggregate, AggregateConfig};
//!
//! let mut builder = Frame::builder();
//! builder.push("group", ColumnData::categorical_from_labels(&["A", "A", "B", "B"])).unwrap();
//! builder.push("CD3E", ColumnData::Numeric(vec![0.0, 2.0, 5.0, 5.0])).unwrap();
//! let frame = builder.finish();
//!
//! let config = AggregateConfig::new("group").with_threshold(1.0);
//! let summary = aggregate(&frame, &["CD3E"], &config).unwrap();
//! assert_eq!(summary.column("percentage").and_then(|c| c.to_f64()), Some(vec![50.0, 100.0]));
//! ```

pub mod aggregate;
pub mod breaks;
pub mod centroid;
pub mod descriptive;
pub mod midpoint;

pub use aggregate::{
    aggregate, dotplot_frame, sort_frame, unpivot, AggregateConfig, GroupOrder, SortSpec,
    Statistic,
};
pub use breaks::range_inclusive;
pub use centroid::group_centroids;
pub use descriptive::{mean, median, min_max};
pub use midpoint::{column_midpoint, midpoint, Midpoint};

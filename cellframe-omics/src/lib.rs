//! Single-cell data containers and chart-ready frame construction.
//!
//! This crate turns an annotated two-axis dataset into flat tables:
//!
//! - **Containers** — [`AnnData`] with typed metadata ([`ColumnData`]), named
//!   embeddings, and a dense or sparse ([`SparseMatrix`]) primary matrix
//! - **Resolution** — [`KeyIndex`] classifies keys into [`Namespace`]s and
//!   infers the [`Axis`] of a key set
//! - **Extraction** — [`Extractor`] pulls metadata columns and `f32`
//!   expression columns
//! - **Frames** — [`build_frame`] assembles an immutable [`Frame`]
//!
//! # Quick start
//!
//! ```
//! use cellframe_omics::{build_frame, AnnData, FrameOptions, MatrixData};
//!
//! let x = MatrixData::Dense(vec![vec![1.0, 0.0], vec![0.0, 2.0]]);
//! let mut adata = AnnData::new(
//!     x,
//!     vec!["AAAC".into(), "AAAG".into()],
//!     vec!["CD3E".into(), "MS4A1".into()],
//! ).unwrap();
//! adata.add_obs_categorical("leiden", &["0", "1"]).unwrap();
//!
//! let frame = build_frame(&adata, &["CD3E"], &FrameOptions::default()).unwrap();
//! assert_eq!(frame.names(), vec!["Barcode", "leiden", "CD3E"]);
//! ```

pub mod build;
pub mod extract;
pub mod frame;
pub mod resolve;
pub mod single_cell;
pub mod sparse;

pub use build::{
    broadcast_pairs, build_frame, build_pair_frames, embedding_column_name, observations_frame,
    variables_frame, FrameOptions,
};
pub use extract::{extract, Extractor};
pub use frame::{Column, Frame, FrameBuilder};
pub use resolve::{check_conflicts, resolve_axis, Axis, KeyIndex, Namespace};
pub use single_cell::{AnnData, ColumnData, DataType, Embedding, MatrixData, MetadataTable};
pub use sparse::{SparseFormat, SparseMatrix};

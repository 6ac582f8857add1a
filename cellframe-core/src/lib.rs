//! Shared primitives and traits for the cellframe crates.
//!
//! `cellframe-core` provides the foundation the other crates build on:
//!
//! - **Error types** — [`CellframeError`] and [`Result`] for structured error handling
//! - **Traits** — [`Summarizable`] for one-line summaries and [`ColumnSlice`]
//!   for column extraction from dense or sparse matrices

pub mod error;
pub mod traits;

pub use error::{CellframeError, Result};
pub use traits::*;

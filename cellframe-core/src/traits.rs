//! Core trait definitions for the cellframe crates.
//!
//! These traits define the contracts that domain types implement across crates.

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A one-line summary suitable for display.
    fn summary(&self) -> String;
}

/// A two-dimensional numeric store that can hand out dense columns.
///
/// Implemented by dense and sparse matrices alike so extraction code is
/// written once against this interface.
pub trait ColumnSlice {
    /// (n_rows, n_cols).
    fn shape(&self) -> (usize, usize);

    /// Materialize the selected columns as dense `f32` vectors, one per index,
    /// in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`CellframeError::InvalidInput`](crate::CellframeError::InvalidInput)
    /// if any index is out of bounds.
    fn column_slice(&self, indices: &[usize]) -> crate::Result<Vec<Vec<f32>>>;

    /// Materialize a single column.
    fn column_f32(&self, index: usize) -> crate::Result<Vec<f32>> {
        let mut cols = self.column_slice(&[index])?;
        Ok(cols.pop().unwrap_or_default())
    }
}

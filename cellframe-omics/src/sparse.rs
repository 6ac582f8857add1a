//! Compressed sparse matrix (CSR or CSC).
//!
//! [`SparseMatrix`] stores non-zero entries in compressed form along one axis:
//! rows for [`SparseFormat::Csr`], columns for [`SparseFormat::Csc`]. Both are
//! the on-disk layouts of single-cell count matrices. Column extraction only
//! materializes the requested columns; nothing else is densified.

use cellframe_core::{CellframeError, ColumnSlice, Result, Summarizable};

/// Compression axis of a [`SparseMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SparseFormat {
    /// Compressed sparse row: `indptr` has `n_rows + 1` entries, `indices` are columns.
    Csr,
    /// Compressed sparse column: `indptr` has `n_cols + 1` entries, `indices` are rows.
    Csc,
}

/// A sparse matrix in compressed (CSR or CSC) format.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    format: SparseFormat,
    data: Vec<f64>,
    indices: Vec<usize>,
    indptr: Vec<usize>,
    n_rows: usize,
    n_cols: usize,
}

impl SparseMatrix {
    /// Create an empty CSR matrix with the given dimensions.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            format: SparseFormat::Csr,
            data: Vec::new(),
            indices: Vec::new(),
            indptr: vec![0; n_rows + 1],
            n_rows,
            n_cols,
        }
    }

    /// Build a CSR matrix from COO triplets.
    ///
    /// All three vectors must have the same length, and all indices must be
    /// within bounds. Duplicate coordinates are summed.
    pub fn from_triplets(
        rows: Vec<usize>,
        cols: Vec<usize>,
        values: Vec<f64>,
        n_rows: usize,
        n_cols: usize,
    ) -> Result<Self> {
        if rows.len() != cols.len() || cols.len() != values.len() {
            return Err(CellframeError::InvalidInput(
                "rows, cols, and values must have the same length".into(),
            ));
        }
        for (i, (&r, &c)) in rows.iter().zip(cols.iter()).enumerate() {
            if r >= n_rows || c >= n_cols {
                return Err(CellframeError::InvalidInput(format!(
                    "triplet {i} index ({r}, {c}) out of bounds for ({n_rows}, {n_cols})"
                )));
            }
        }

        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by_key(|&i| (rows[i], cols[i]));

        let mut data: Vec<f64> = Vec::with_capacity(values.len());
        let mut indices: Vec<usize> = Vec::with_capacity(values.len());
        let mut indptr = vec![0usize; n_rows + 1];
        let mut last: Option<(usize, usize)> = None;

        for &i in &order {
            let coord = (rows[i], cols[i]);
            if last == Some(coord) {
                if let Some(v) = data.last_mut() {
                    *v += values[i];
                }
                continue;
            }
            data.push(values[i]);
            indices.push(cols[i]);
            indptr[rows[i] + 1] += 1;
            last = Some(coord);
        }
        for i in 1..=n_rows {
            indptr[i] += indptr[i - 1];
        }

        Ok(Self {
            format: SparseFormat::Csr,
            data,
            indices,
            indptr,
            n_rows,
            n_cols,
        })
    }

    /// Create a sparse matrix from CSR arrays.
    ///
    /// - `data` — non-zero values
    /// - `indices` — column index for each value
    /// - `indptr` — row pointer array (length `n_rows + 1`)
    pub fn from_csr(
        data: Vec<f64>,
        indices: Vec<usize>,
        indptr: Vec<usize>,
        n_rows: usize,
        n_cols: usize,
    ) -> Result<Self> {
        validate_compressed("CSR", &data, &indices, &indptr, n_rows, n_cols)?;
        Ok(Self {
            format: SparseFormat::Csr,
            data,
            indices,
            indptr,
            n_rows,
            n_cols,
        })
    }

    /// Create a sparse matrix from CSC arrays.
    ///
    /// - `data` — non-zero values
    /// - `indices` — row index for each value
    /// - `indptr` — column pointer array (length `n_cols + 1`)
    pub fn from_csc(
        data: Vec<f64>,
        indices: Vec<usize>,
        indptr: Vec<usize>,
        n_rows: usize,
        n_cols: usize,
    ) -> Result<Self> {
        validate_compressed("CSC", &data, &indices, &indptr, n_cols, n_rows)?;
        Ok(Self {
            format: SparseFormat::Csc,
            data,
            indices,
            indptr,
            n_rows,
            n_cols,
        })
    }

    /// Create a CSR matrix from dense data, storing only values where `|value| > threshold`.
    pub fn from_dense(data: &[Vec<f64>], threshold: f64) -> Self {
        let n_rows = data.len();
        let n_cols = data.first().map_or(0, |r| r.len());
        let mut values = Vec::new();
        let mut indices = Vec::new();
        let mut indptr = Vec::with_capacity(n_rows + 1);
        indptr.push(0);

        for row in data {
            for (c, &val) in row.iter().enumerate() {
                if val.abs() > threshold {
                    values.push(val);
                    indices.push(c);
                }
            }
            indptr.push(values.len());
        }

        Self {
            format: SparseFormat::Csr,
            data: values,
            indices,
            indptr,
            n_rows,
            n_cols,
        }
    }

    /// Compression axis of this matrix.
    pub fn format(&self) -> SparseFormat {
        self.format
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Fraction of entries that are stored: `nnz / (n_rows * n_cols)`.
    pub fn density(&self) -> f64 {
        let total = self.n_rows as f64 * self.n_cols as f64;
        if total == 0.0 {
            return 0.0;
        }
        self.data.len() as f64 / total
    }

    /// (n_rows, n_cols).
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Get the value at `(row, col)`. Returns 0.0 if no entry is stored or
    /// the coordinate is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.n_rows || col >= self.n_cols {
            return 0.0;
        }
        let (major, minor) = match self.format {
            SparseFormat::Csr => (row, col),
            SparseFormat::Csc => (col, row),
        };
        let range = self.indptr[major]..self.indptr[major + 1];
        self.indices[range.clone()]
            .iter()
            .position(|&i| i == minor)
            .map_or(0.0, |p| self.data[range.start + p])
    }

    /// Re-compress along columns. A CSC matrix is returned as a clone.
    pub fn to_csc(&self) -> SparseMatrix {
        if self.format == SparseFormat::Csc {
            return self.clone();
        }
        let mut counts = vec![0usize; self.n_cols + 1];
        for &c in &self.indices {
            counts[c + 1] += 1;
        }
        for i in 1..=self.n_cols {
            counts[i] += counts[i - 1];
        }
        let indptr = counts.clone();
        let mut next = counts;
        let mut data = vec![0.0; self.nnz()];
        let mut indices = vec![0usize; self.nnz()];
        for (r, c, v) in self.iter() {
            let slot = next[c];
            data[slot] = v;
            indices[slot] = r;
            next[c] += 1;
        }
        SparseMatrix {
            format: SparseFormat::Csc,
            data,
            indices,
            indptr,
            n_rows: self.n_rows,
            n_cols: self.n_cols,
        }
    }

    /// Iterate over stored triplets `(row, col, value)` in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let format = self.format;
        self.indptr.windows(2).enumerate().flat_map(move |(major, w)| {
            (w[0]..w[1]).map(move |p| {
                let minor = self.indices[p];
                match format {
                    SparseFormat::Csr => (major, minor, self.data[p]),
                    SparseFormat::Csc => (minor, major, self.data[p]),
                }
            })
        })
    }
}

fn validate_compressed(
    label: &str,
    data: &[f64],
    indices: &[usize],
    indptr: &[usize],
    n_major: usize,
    n_minor: usize,
) -> Result<()> {
    if data.len() != indices.len() {
        return Err(CellframeError::InvalidInput(format!(
            "{label} data and indices must have the same length"
        )));
    }
    if indptr.len() != n_major + 1 {
        return Err(CellframeError::InvalidInput(format!(
            "{label} indptr length ({}) must be {}",
            indptr.len(),
            n_major + 1
        )));
    }
    if indptr.first() != Some(&0) || indptr.last() != Some(&data.len()) {
        return Err(CellframeError::InvalidInput(format!(
            "{label} indptr must start at 0 and end at nnz ({})",
            data.len()
        )));
    }
    if indptr.windows(2).any(|w| w[0] > w[1]) {
        return Err(CellframeError::InvalidInput(format!(
            "{label} indptr must be non-decreasing"
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i >= n_minor) {
        return Err(CellframeError::InvalidInput(format!(
            "{label} index {bad} out of bounds for {n_minor}"
        )));
    }
    Ok(())
}

impl ColumnSlice for SparseMatrix {
    fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    fn column_slice(&self, indices: &[usize]) -> Result<Vec<Vec<f32>>> {
        if let Some(&bad) = indices.iter().find(|&&j| j >= self.n_cols) {
            return Err(CellframeError::InvalidInput(format!(
                "column index {bad} out of bounds (n_cols={})",
                self.n_cols
            )));
        }
        let mut out = vec![vec![0.0f32; self.n_rows]; indices.len()];
        match self.format {
            SparseFormat::Csc => {
                for (k, &col) in indices.iter().enumerate() {
                    for p in self.indptr[col]..self.indptr[col + 1] {
                        out[k][self.indices[p]] += self.data[p] as f32;
                    }
                }
            }
            SparseFormat::Csr => {
                // one pass over the stored entries serves every requested column
                let mut wanted: Vec<Vec<usize>> = vec![Vec::new(); self.n_cols];
                for (k, &col) in indices.iter().enumerate() {
                    wanted[col].push(k);
                }
                for (r, c, v) in self.iter() {
                    for &k in &wanted[c] {
                        out[k][r] += v as f32;
                    }
                }
            }
        }
        Ok(out)
    }
}

impl Summarizable for SparseMatrix {
    fn summary(&self) -> String {
        let label = match self.format {
            SparseFormat::Csr => "CSR",
            SparseFormat::Csc => "CSC",
        };
        format!(
            "SparseMatrix ({label}): {}\u{00d7}{}, {} nonzeros ({:.2}% density)",
            self.n_rows,
            self.n_cols,
            self.nnz(),
            self.density() * 100.0
        )
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_dense() -> impl Strategy<Value = Vec<Vec<f64>>> {
        (1..8usize, 1..8usize).prop_flat_map(|(r, c)| {
            proptest::collection::vec(
                proptest::collection::vec(prop_oneof![Just(0.0), -50.0..50.0f64], c),
                r,
            )
        })
    }

    proptest! {
        #[test]
        fn csr_and_csc_columns_match_dense(dense in arb_dense()) {
            let csr = SparseMatrix::from_dense(&dense, 0.0);
            let csc = csr.to_csc();
            let n_cols = dense[0].len();
            let all: Vec<usize> = (0..n_cols).collect();
            let from_csr = csr.column_slice(&all).unwrap();
            let from_csc = csc.column_slice(&all).unwrap();
            for j in 0..n_cols {
                let expected: Vec<f32> = dense.iter().map(|row| row[j] as f32).collect();
                prop_assert_eq!(&from_csr[j], &expected);
                prop_assert_eq!(&from_csc[j], &expected);
            }
        }
    }
}

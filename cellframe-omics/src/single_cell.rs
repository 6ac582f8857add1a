//! AnnData-like container for single-cell omics data.
//!
//! Provides an in-memory, read-mostly representation of the scverse AnnData
//! layout that the frame builders consume.
//!
//! # Structure
//!
//! - `X` — primary data matrix (cells × genes), dense or sparse
//! - `obs` — per-cell metadata table (ordered, typed columns)
//! - `var` — per-gene metadata table
//! - `obsm` / `varm` — named embeddings (e.g. PCA, UMAP coordinates)
//!
//! # Example
//!
//! ```
//! use cellframe_omics::single_cell::{AnnData, MatrixData};
//!
//! let x = MatrixData::Dense(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
//! let adata = AnnData::new(
//!     x,
//!     vec!["cell_1".into(), "cell_2".into()],
//!     vec!["gene_a".into(), "gene_b".into()],
//! ).unwrap();
//! assert_eq!(adata.n_obs(), 2);
//! assert_eq!(adata.n_vars(), 2);
//! ```

use cellframe_core::{CellframeError, ColumnSlice, Result, Summarizable};

use crate::sparse::SparseMatrix;

/// The primary data matrix, either dense or sparse.
#[derive(Debug, Clone)]
pub enum MatrixData {
    /// Dense row-major matrix (n_obs × n_vars).
    Dense(Vec<Vec<f64>>),
    /// Compressed sparse matrix.
    Sparse(SparseMatrix),
}

impl MatrixData {
    /// (n_obs, n_vars).
    pub fn shape(&self) -> (usize, usize) {
        match self {
            MatrixData::Dense(rows) => {
                let n_obs = rows.len();
                let n_vars = rows.first().map_or(0, |r| r.len());
                (n_obs, n_vars)
            }
            MatrixData::Sparse(s) => s.shape(),
        }
    }

    /// Whether the matrix is stored sparsely.
    pub fn is_sparse(&self) -> bool {
        matches!(self, MatrixData::Sparse(_))
    }
}

impl ColumnSlice for MatrixData {
    fn shape(&self) -> (usize, usize) {
        MatrixData::shape(self)
    }

    fn column_slice(&self, indices: &[usize]) -> Result<Vec<Vec<f32>>> {
        match self {
            MatrixData::Dense(rows) => {
                let n_vars = rows.first().map_or(0, |r| r.len());
                if let Some(&bad) = indices.iter().find(|&&j| j >= n_vars) {
                    return Err(CellframeError::InvalidInput(format!(
                        "column index {bad} out of bounds (n_vars={n_vars})"
                    )));
                }
                indices
                    .iter()
                    .map(|&j| {
                        rows.iter()
                            .enumerate()
                            .map(|(i, row)| {
                                row.get(j).map(|&v| v as f32).ok_or_else(|| {
                                    CellframeError::InvalidInput(format!(
                                        "dense row {i} has {} columns, expected {n_vars}",
                                        row.len()
                                    ))
                                })
                            })
                            .collect::<Result<Vec<f32>>>()
                    })
                    .collect()
            }
            MatrixData::Sparse(s) => s.column_slice(indices),
        }
    }
}

/// A metadata column with typed data.
///
/// Supports the column kinds found in `.h5ad` metadata tables, plus the
/// `f32` columns produced by expression extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Free-text string values.
    Strings(Vec<String>),
    /// Numeric (f64) values. `NaN` marks a missing value.
    Numeric(Vec<f64>),
    /// Single-precision values, as produced by expression extraction.
    Float32(Vec<f32>),
    /// Boolean flags.
    Boolean(Vec<bool>),
    /// Categorical data stored as integer codes indexing into an ordered
    /// category list. Code `-1` marks a missing value.
    ///
    /// Labels are kept verbatim and the column always reports
    /// [`DataType::Categorical`], so cluster labels such as `"0"`, `"1"` stay
    /// discrete: [`to_f64`](Self::to_f64) refuses them and frame export writes
    /// them as strings.
    Categorical {
        codes: Vec<i32>,
        categories: Vec<String>,
    },
}

/// The kind of a [`ColumnData`], without its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    String,
    Float64,
    Float32,
    Boolean,
    Categorical,
}

impl DataType {
    /// Whether values of this type map onto a continuous scale.
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Float64 | DataType::Float32)
    }
}

impl ColumnData {
    /// Build a categorical column from labels, keeping categories in order of
    /// first appearance.
    pub fn categorical_from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut categories: Vec<String> = Vec::new();
        let codes = labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                match categories.iter().position(|c| c == label) {
                    Some(i) => i as i32,
                    None => {
                        categories.push(label.to_string());
                        (categories.len() - 1) as i32
                    }
                }
            })
            .collect();
        ColumnData::Categorical { codes, categories }
    }

    /// Number of elements in this column.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Strings(v) => v.len(),
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Categorical { codes, .. } => codes.len(),
        }
    }

    /// Whether the column is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The column's type tag.
    pub fn dtype(&self) -> DataType {
        match self {
            ColumnData::Strings(_) => DataType::String,
            ColumnData::Numeric(_) => DataType::Float64,
            ColumnData::Float32(_) => DataType::Float32,
            ColumnData::Boolean(_) => DataType::Boolean,
            ColumnData::Categorical { .. } => DataType::Categorical,
        }
    }

    /// Try to get as string slice. Returns `None` if not `Strings` variant.
    pub fn as_strings(&self) -> Option<&Vec<String>> {
        match self {
            ColumnData::Strings(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as numeric slice. Returns `None` if not `Numeric` variant.
    pub fn as_numeric(&self) -> Option<&Vec<f64>> {
        match self {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as `f32` slice. Returns `None` if not `Float32` variant.
    pub fn as_f32(&self) -> Option<&Vec<f32>> {
        match self {
            ColumnData::Float32(v) => Some(v),
            _ => None,
        }
    }

    /// Values widened to `f64`, with missing entries as `NaN`.
    ///
    /// Booleans map to `0.0`/`1.0`. Returns `None` for string and
    /// categorical columns, which have no numeric interpretation.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            ColumnData::Numeric(v) => Some(v.clone()),
            ColumnData::Float32(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            ColumnData::Boolean(v) => Some(v.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect()),
            ColumnData::Strings(_) | ColumnData::Categorical { .. } => None,
        }
    }

    /// Display label of element `i`, or `None` when missing or out of range.
    pub fn label(&self, i: usize) -> Option<String> {
        match self {
            ColumnData::Strings(v) => v.get(i).cloned(),
            ColumnData::Numeric(v) => v.get(i).filter(|x| !x.is_nan()).map(|x| x.to_string()),
            ColumnData::Float32(v) => v.get(i).filter(|x| !x.is_nan()).map(|x| x.to_string()),
            ColumnData::Boolean(v) => v.get(i).map(|b| b.to_string()),
            ColumnData::Categorical { codes, categories } => codes
                .get(i)
                .filter(|&&c| c >= 0)
                .and_then(|&c| categories.get(c as usize))
                .cloned(),
        }
    }

    /// Subset to the given indices.
    pub fn subset(&self, indices: &[usize]) -> Self {
        match self {
            ColumnData::Strings(v) => {
                ColumnData::Strings(indices.iter().map(|&i| v[i].clone()).collect())
            }
            ColumnData::Numeric(v) => ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Float32(v) => ColumnData::Float32(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Boolean(v) => ColumnData::Boolean(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Categorical { codes, categories } => ColumnData::Categorical {
                codes: indices.iter().map(|&i| codes[i]).collect(),
                categories: categories.clone(),
            },
        }
    }
}

/// An ordered table of equal-length named columns.
///
/// Column order is insertion order. Re-inserting an existing name replaces
/// the column in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTable {
    n_rows: usize,
    columns: Vec<(String, ColumnData)>,
}

impl MetadataTable {
    /// An empty table whose columns must all have `n_rows` entries.
    pub fn new(n_rows: usize) -> Self {
        Self {
            n_rows,
            columns: Vec::new(),
        }
    }

    /// Number of rows every column must have.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Insert or replace a column.
    pub fn insert(&mut self, name: &str, data: ColumnData) -> Result<()> {
        if data.len() != self.n_rows {
            return Err(CellframeError::InvalidInput(format!(
                "column '{}' length ({}) does not match table height ({})",
                name,
                data.len(),
                self.n_rows
            )));
        }
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = data,
            None => self.columns.push((name.to_string(), data)),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Column names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, column)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnData)> + '_ {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

}

/// A named low-dimensional coordinate matrix attached to an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    name: String,
    rows: Vec<Vec<f64>>,
    n_dims: usize,
}

impl Embedding {
    /// Create an embedding with one row per axis element.
    ///
    /// Every row must have the same number of dimensions, and there must be
    /// at least two.
    pub fn new(name: &str, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_dims = rows.first().map_or(0, |r| r.len());
        if let Some(i) = rows.iter().position(|r| r.len() != n_dims) {
            return Err(CellframeError::InvalidInput(format!(
                "embedding '{name}' row {i} has {} dimensions, expected {n_dims}",
                rows[i].len()
            )));
        }
        if !rows.is_empty() && n_dims < 2 {
            return Err(CellframeError::InvalidInput(format!(
                "embedding '{name}' needs at least 2 dimensions, got {n_dims}"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            rows,
            n_dims,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows (axis elements).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of coordinate dimensions.
    pub fn n_dims(&self) -> usize {
        self.n_dims
    }

    /// Row-major coordinates.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// One coordinate dimension (0-based) across all rows.
    pub fn dimension(&self, dim: usize) -> Option<Vec<f64>> {
        if dim >= self.n_dims {
            return None;
        }
        Some(self.rows.iter().map(|r| r[dim]).collect())
    }
}

/// AnnData-like container for single-cell data.
#[derive(Debug, Clone)]
pub struct AnnData {
    /// Primary data matrix (n_obs × n_vars).
    x: MatrixData,
    /// Observation (cell) names.
    obs_names: Vec<String>,
    /// Variable (gene) names.
    var_names: Vec<String>,
    /// Per-cell metadata.
    obs: MetadataTable,
    /// Per-gene metadata.
    var: MetadataTable,
    /// Observation embeddings, in insertion order.
    obsm: Vec<Embedding>,
    /// Variable embeddings, in insertion order.
    varm: Vec<Embedding>,
}

impl AnnData {
    /// Create a new AnnData container.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix dimensions don't match the name vectors,
    /// if a dense matrix has rows of different lengths, or if a name appears
    /// twice on the same axis.
    pub fn new(x: MatrixData, obs_names: Vec<String>, var_names: Vec<String>) -> Result<Self> {
        let (n_obs, n_vars) = x.shape();
        if let MatrixData::Dense(rows) = &x {
            if let Some(i) = rows.iter().position(|r| r.len() != n_vars) {
                return Err(CellframeError::InvalidInput(format!(
                    "dense matrix row {i} has {} columns, expected {n_vars}",
                    rows[i].len()
                )));
            }
        }
        if obs_names.len() != n_obs {
            return Err(CellframeError::InvalidInput(format!(
                "obs_names length ({}) does not match n_obs ({})",
                obs_names.len(),
                n_obs
            )));
        }
        if var_names.len() != n_vars {
            return Err(CellframeError::InvalidInput(format!(
                "var_names length ({}) does not match n_vars ({})",
                var_names.len(),
                n_vars
            )));
        }
        check_unique("obs_names", &obs_names)?;
        check_unique("var_names", &var_names)?;

        Ok(Self {
            x,
            obs: MetadataTable::new(obs_names.len()),
            var: MetadataTable::new(var_names.len()),
            obs_names,
            var_names,
            obsm: Vec::new(),
            varm: Vec::new(),
        })
    }

    /// Number of observations (cells).
    pub fn n_obs(&self) -> usize {
        self.obs_names.len()
    }

    /// Number of variables (genes).
    pub fn n_vars(&self) -> usize {
        self.var_names.len()
    }

    /// Shape of the primary data matrix.
    pub fn shape(&self) -> (usize, usize) {
        self.x.shape()
    }

    /// Access the primary data matrix.
    pub fn x(&self) -> &MatrixData {
        &self.x
    }

    /// Observation names.
    pub fn obs_names(&self) -> &[String] {
        &self.obs_names
    }

    /// Variable names.
    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    /// Add a per-cell string metadata column.
    pub fn add_obs(&mut self, key: &str, values: Vec<String>) -> Result<()> {
        self.add_obs_column(key, ColumnData::Strings(values))
    }

    /// Add a per-cell numeric metadata column.
    pub fn add_obs_numeric(&mut self, key: &str, values: Vec<f64>) -> Result<()> {
        self.add_obs_column(key, ColumnData::Numeric(values))
    }

    /// Add a per-cell categorical column from labels.
    pub fn add_obs_categorical<S: AsRef<str>>(&mut self, key: &str, labels: &[S]) -> Result<()> {
        self.add_obs_column(key, ColumnData::categorical_from_labels(labels))
    }

    /// Add a per-cell metadata column of any type.
    pub fn add_obs_column(&mut self, key: &str, data: ColumnData) -> Result<()> {
        self.obs.insert(key, data)
    }

    /// Get per-cell metadata column as typed data.
    pub fn get_obs(&self, key: &str) -> Option<&ColumnData> {
        self.obs.get(key)
    }

    /// Observation metadata table.
    pub fn obs(&self) -> &MetadataTable {
        &self.obs
    }

    /// Add a per-gene string metadata column.
    pub fn add_var(&mut self, key: &str, values: Vec<String>) -> Result<()> {
        self.add_var_column(key, ColumnData::Strings(values))
    }

    /// Add a per-gene numeric metadata column.
    pub fn add_var_numeric(&mut self, key: &str, values: Vec<f64>) -> Result<()> {
        self.add_var_column(key, ColumnData::Numeric(values))
    }

    /// Add a per-gene metadata column of any type.
    pub fn add_var_column(&mut self, key: &str, data: ColumnData) -> Result<()> {
        self.var.insert(key, data)
    }

    /// Get per-gene metadata column as typed data.
    pub fn get_var(&self, key: &str) -> Option<&ColumnData> {
        self.var.get(key)
    }

    /// Variable metadata table.
    pub fn var(&self) -> &MetadataTable {
        &self.var
    }

    /// Add or replace an observation embedding (e.g. `X_umap`).
    pub fn add_obsm(&mut self, key: &str, data: Vec<Vec<f64>>) -> Result<()> {
        let embedding = Embedding::new(key, data)?;
        if embedding.len() != self.n_obs() {
            return Err(CellframeError::InvalidInput(format!(
                "obsm '{}' length ({}) does not match n_obs ({})",
                key,
                embedding.len(),
                self.n_obs()
            )));
        }
        upsert_embedding(&mut self.obsm, embedding);
        Ok(())
    }

    /// Get an observation embedding.
    pub fn get_obsm(&self, key: &str) -> Option<&Embedding> {
        self.obsm.iter().find(|e| e.name() == key)
    }

    /// All observation embeddings, in insertion order.
    pub fn obsm(&self) -> &[Embedding] {
        &self.obsm
    }

    /// Add or replace a variable embedding.
    pub fn add_varm(&mut self, key: &str, data: Vec<Vec<f64>>) -> Result<()> {
        let embedding = Embedding::new(key, data)?;
        if embedding.len() != self.n_vars() {
            return Err(CellframeError::InvalidInput(format!(
                "varm '{}' length ({}) does not match n_vars ({})",
                key,
                embedding.len(),
                self.n_vars()
            )));
        }
        upsert_embedding(&mut self.varm, embedding);
        Ok(())
    }

    /// Get a variable embedding.
    pub fn get_varm(&self, key: &str) -> Option<&Embedding> {
        self.varm.iter().find(|e| e.name() == key)
    }

    /// All variable embeddings, in insertion order.
    pub fn varm(&self) -> &[Embedding] {
        &self.varm
    }

}

fn check_unique(label: &str, names: &[String]) -> Result<()> {
    let mut seen = std::collections::HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(CellframeError::InvalidInput(format!(
                "{label} contains duplicate name '{name}'"
            )));
        }
    }
    Ok(())
}

fn upsert_embedding(slot: &mut Vec<Embedding>, embedding: Embedding) {
    match slot.iter_mut().find(|e| e.name() == embedding.name()) {
        Some(existing) => *existing = embedding,
        None => slot.push(embedding),
    }
}

impl Summarizable for AnnData {
    fn summary(&self) -> String {
        format!(
            "AnnData: {} obs \u{00d7} {} vars, {} obs columns, {} var columns, {} obsm, {} varm",
            self.n_obs(),
            self.n_vars(),
            self.obs.n_columns(),
            self.var.n_columns(),
            self.obsm.len(),
            self.varm.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_adata() -> AnnData {
        let x = MatrixData::Dense(vec![
            vec![1.0, 2.0, 0.0],
            vec![3.0, 0.0, 4.0],
            vec![0.0, 5.0, 6.0],
        ]);
        AnnData::new(
            x,
            vec!["cell_1".into(), "cell_2".into(), "cell_3".into()],
            vec!["gene_a".into(), "gene_b".into(), "gene_c".into()],
        )
        .unwrap()
    }

    #[test]
    fn basic_construction() {
        let adata = sample_adata();
        assert_eq!(adata.n_obs(), 3);
        assert_eq!(adata.n_vars(), 3);
        assert_eq!(adata.shape(), (3, 3));
    }

    #[test]
    fn dimension_mismatch_error() {
        let x = MatrixData::Dense(vec![vec![1.0, 2.0]]);
        let result = AnnData::new(
            x,
            vec!["cell_1".into(), "cell_2".into()],
            vec!["gene_a".into(), "gene_b".into()],
        );
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_names_rejected() {
        let x = MatrixData::Dense(vec![vec![1.0, 2.0]]);
        let result = AnnData::new(x, vec!["c".into()], vec!["g".into(), "g".into()]);
        assert!(matches!(result, Err(CellframeError::InvalidInput(_))));
    }

    #[test]
    fn obs_metadata_keeps_order() {
        let mut adata = sample_adata();
        adata.add_obs_numeric("n_counts", vec![3.0, 7.0, 11.0]).unwrap();
        adata.add_obs_categorical("leiden", &["1", "0", "1"]).unwrap();
        adata.add_obs("sample", vec!["a".into(), "a".into(), "b".into()]).unwrap();
        let names: Vec<&str> = adata.obs().names().collect();
        assert_eq!(names, vec!["n_counts", "leiden", "sample"]);
        assert!(adata.get_obs("missing").is_none());

        // replacing keeps the original slot
        adata.add_obs_numeric("n_counts", vec![0.0, 0.0, 0.0]).unwrap();
        let names: Vec<&str> = adata.obs().names().collect();
        assert_eq!(names, vec!["n_counts", "leiden", "sample"]);
    }

    #[test]
    fn obs_metadata_length_mismatch() {
        let mut adata = sample_adata();
        let result = adata.add_obs("bad", vec!["a".into()]);
        assert!(result.is_err());
    }

    #[test]
    fn var_metadata() {
        let mut adata = sample_adata();
        adata
            .add_var("gene_type", vec!["coding".into(), "coding".into(), "lncRNA".into()])
            .unwrap();
        let gt = adata.get_var("gene_type").and_then(|c| c.as_strings()).unwrap();
        assert_eq!(gt[2], "lncRNA");
    }

    #[test]
    fn categorical_from_labels() {
        let col = ColumnData::categorical_from_labels(&["b", "a", "b"]);
        assert_eq!(
            col,
            ColumnData::Categorical {
                codes: vec![0, 1, 0],
                categories: vec!["b".into(), "a".into()],
            }
        );
        assert_eq!(col.label(2).as_deref(), Some("b"));
        assert_eq!(col.dtype(), DataType::Categorical);
    }

    #[test]
    fn missing_labels() {
        let col = ColumnData::Categorical {
            codes: vec![0, -1],
            categories: vec!["x".into()],
        };
        assert_eq!(col.label(1), None);
        assert_eq!(ColumnData::Numeric(vec![f64::NAN]).label(0), None);
    }

    #[test]
    fn to_f64_conversions() {
        assert_eq!(
            ColumnData::Boolean(vec![true, false]).to_f64(),
            Some(vec![1.0, 0.0])
        );
        assert_eq!(ColumnData::Float32(vec![1.5]).to_f64(), Some(vec![1.5]));
        assert_eq!(ColumnData::Strings(vec!["a".into()]).to_f64(), None);
    }

    #[test]
    fn obsm_embedding() {
        let mut adata = sample_adata();
        let pca = vec![vec![0.1, 0.2], vec![0.3, 0.4], vec![0.5, 0.6]];
        adata.add_obsm("X_pca", pca).unwrap();
        let emb = adata.get_obsm("X_pca").unwrap();
        assert_eq!(emb.len(), 3);
        assert_eq!(emb.n_dims(), 2);
        assert_eq!(emb.dimension(1), Some(vec![0.2, 0.4, 0.6]));
        assert_eq!(emb.dimension(2), None);
    }

    #[test]
    fn embedding_needs_two_dims() {
        let mut adata = sample_adata();
        assert!(adata.add_obsm("X_bad", vec![vec![0.1], vec![0.2], vec![0.3]]).is_err());
        assert!(adata
            .add_obsm("X_ragged", vec![vec![0.1, 0.2], vec![0.2], vec![0.3, 0.1]])
            .is_err());
        assert!(adata.add_obsm("X_short", vec![vec![0.1, 0.2]]).is_err());
    }

    #[test]
    fn varm_embedding() {
        let mut adata = sample_adata();
        adata
            .add_varm("PCs", vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]])
            .unwrap();
        assert_eq!(adata.varm().len(), 1);
        assert!(adata.get_varm("PCs").is_some());
    }

    #[test]
    fn column_slice_dense() {
        let adata = sample_adata();
        let cols = adata.x().column_slice(&[1]).unwrap();
        assert_eq!(cols, vec![vec![2.0f32, 0.0, 5.0]]);
        assert!(adata.x().column_slice(&[3]).is_err());
    }

    #[test]
    fn ragged_dense_rejected() {
        let x = MatrixData::Dense(vec![vec![1.0, 0.0], vec![3.0]]);
        let result = AnnData::new(x, vec!["c1".into(), "c2".into()], vec!["g1".into(), "g2".into()]);
        assert!(matches!(result, Err(CellframeError::InvalidInput(_))));
    }

    #[test]
    fn ragged_dense_slice_is_error() {
        let x = MatrixData::Dense(vec![vec![1.0, 0.0], vec![3.0]]);
        assert!(matches!(
            x.column_slice(&[1]),
            Err(CellframeError::InvalidInput(_))
        ));
        assert_eq!(x.column_slice(&[0]).unwrap(), vec![vec![1.0f32, 3.0]]);
    }

    #[test]
    fn sparse_x() {
        let s = SparseMatrix::from_triplets(vec![0, 1], vec![0, 1], vec![5.0, 10.0], 2, 2).unwrap();
        let x = MatrixData::Sparse(s);
        let adata = AnnData::new(x, vec!["c1".into(), "c2".into()], vec!["g1".into(), "g2".into()])
            .unwrap();
        assert!(adata.x().is_sparse());
        assert_eq!(adata.x().column_slice(&[0]).unwrap(), vec![vec![5.0f32, 0.0]]);
    }

    #[test]
    fn summary_format() {
        let adata = sample_adata();
        let s = adata.summary();
        assert!(s.contains("3 obs"));
        assert!(s.contains("3 vars"));
        assert!(s.contains("0 obsm"));
    }
}

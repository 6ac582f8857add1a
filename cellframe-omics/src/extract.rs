//! Column extraction from an [`AnnData`].
//!
//! Metadata columns are returned as stored; categorical columns keep their
//! labels and stay discrete. Variable names select a column of `X`,
//! which is materialized densely (only the selected columns of a sparse
//! matrix) and cast to `f32`.

use cellframe_core::{CellframeError, ColumnSlice, Result};
use log::debug;

use crate::resolve::{Axis, KeyIndex, Namespace};
use crate::single_cell::{AnnData, ColumnData};

/// Extracts columns from one dataset snapshot.
#[derive(Debug, Clone)]
pub struct Extractor<'a> {
    data: &'a AnnData,
    index: KeyIndex<'a>,
}

impl<'a> Extractor<'a> {
    pub fn new(data: &'a AnnData) -> Self {
        Self {
            data,
            index: KeyIndex::new(data),
        }
    }

    /// Build an extractor around an existing index of the same dataset.
    pub fn with_index(data: &'a AnnData, index: KeyIndex<'a>) -> Self {
        Self { data, index }
    }

    pub fn index(&self) -> &KeyIndex<'a> {
        &self.index
    }

    /// Retrieve the column `key` names on `axis`.
    ///
    /// On the observation axis, `obs` columns take priority over variable
    /// names. On the variable axis only `var` columns qualify.
    pub fn extract(&self, key: &str, axis: Axis) -> Result<ColumnData> {
        let found = match axis {
            Axis::Observation => {
                if let Some(col) = self.data.get_obs(key) {
                    Some(col.clone())
                } else if self.index.is_var_name(key) {
                    Some(ColumnData::Float32(self.expression(key)?))
                } else {
                    None
                }
            }
            Axis::Variable => self.data.get_var(key).cloned(),
        };
        match found {
            Some(col) => Ok(col),
            None => match self.index.namespace(key) {
                Some(ns) => Err(CellframeError::ConflictingKeys(format!(
                    "key '{key}' resolves to {ns:?}, which is not on the {axis:?} axis"
                ))),
                None => Err(CellframeError::KeyNotFound {
                    key: key.to_string(),
                }),
            },
        }
    }

    /// Retrieve a key using its priority namespace.
    pub fn extract_resolved(&self, key: &str) -> Result<(Namespace, ColumnData)> {
        let ns = self.index.resolve_key(key)?;
        Ok((ns, self.extract(key, ns.axis())?))
    }

    /// Expression values of one variable across all observations, as `f32`.
    pub fn expression(&self, var_name: &str) -> Result<Vec<f32>> {
        let mut cols = self.expressions(&[var_name])?;
        Ok(cols.pop().unwrap_or_default())
    }

    /// Expression values of several variables in one pass over `X`.
    pub fn expressions<S: AsRef<str>>(&self, var_names: &[S]) -> Result<Vec<Vec<f32>>> {
        let indices = var_names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.index
                    .var_index(name)
                    .ok_or_else(|| CellframeError::KeyNotFound {
                        key: name.to_string(),
                    })
            })
            .collect::<Result<Vec<usize>>>()?;
        debug!(
            "extracting {} expression column(s) from {} matrix",
            indices.len(),
            if self.data.x().is_sparse() { "sparse" } else { "dense" }
        );
        self.data.x().column_slice(&indices)
    }
}

/// Retrieve a single column. See [`Extractor::extract`].
pub fn extract(data: &AnnData, key: &str, axis: Axis) -> Result<ColumnData> {
    Extractor::new(data).extract(key, axis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::single_cell::{DataType, MatrixData};
    use crate::sparse::SparseMatrix;
    use pretty_assertions::assert_eq;

    fn dense_rows() -> Vec<Vec<f64>> {
        vec![vec![1.0, 0.0, 0.25], vec![0.0, 2.0, 0.0], vec![3.0, 4.0, 0.0]]
    }

    fn build(x: MatrixData) -> AnnData {
        let mut adata = AnnData::new(
            x,
            vec!["AAAC".into(), "AAAG".into(), "AAAT".into()],
            vec!["CD3E".into(), "MS4A1".into(), "LYZ".into()],
        )
        .unwrap();
        adata.add_obs_categorical("leiden", &["2", "0", "10"]).unwrap();
        adata.add_obs_numeric("n_genes", vec![100.0, 200.0, 300.0]).unwrap();
        adata.add_var_numeric("means", vec![0.1, 0.2, 0.3]).unwrap();
        adata
    }

    #[test]
    fn expression_is_f32() {
        let adata = build(MatrixData::Dense(dense_rows()));
        let col = extract(&adata, "MS4A1", Axis::Observation).unwrap();
        assert_eq!(col, ColumnData::Float32(vec![0.0, 2.0, 4.0]));
    }

    #[test]
    fn sparse_and_dense_agree() {
        let dense = build(MatrixData::Dense(dense_rows()));
        let sparse = build(MatrixData::Sparse(SparseMatrix::from_dense(&dense_rows(), 0.0)));
        let csc = build(MatrixData::Sparse(
            SparseMatrix::from_dense(&dense_rows(), 0.0).to_csc(),
        ));
        for gene in ["CD3E", "MS4A1", "LYZ"] {
            let a = extract(&dense, gene, Axis::Observation).unwrap();
            let b = extract(&sparse, gene, Axis::Observation).unwrap();
            let c = extract(&csc, gene, Axis::Observation).unwrap();
            assert_eq!(a, b);
            assert_eq!(a, c);
        }
    }

    #[test]
    fn metadata_verbatim() {
        let adata = build(MatrixData::Dense(dense_rows()));
        assert_eq!(
            extract(&adata, "n_genes", Axis::Observation).unwrap(),
            ColumnData::Numeric(vec![100.0, 200.0, 300.0])
        );
        assert_eq!(
            extract(&adata, "means", Axis::Variable).unwrap(),
            ColumnData::Numeric(vec![0.1, 0.2, 0.3])
        );
    }

    #[test]
    fn numeric_looking_categories_stay_categorical() {
        let adata = build(MatrixData::Dense(dense_rows()));
        let col = extract(&adata, "leiden", Axis::Observation).unwrap();
        assert_eq!(col.dtype(), DataType::Categorical);
        assert!(!col.dtype().is_numeric());
        assert_eq!(col.label(2).as_deref(), Some("10"));
        // the dataset itself is untouched
        assert_eq!(adata.get_obs("leiden"), Some(&col));
    }

    #[test]
    fn wrong_axis_and_missing_keys() {
        let adata = build(MatrixData::Dense(dense_rows()));
        assert!(matches!(
            extract(&adata, "means", Axis::Observation),
            Err(CellframeError::ConflictingKeys(_))
        ));
        assert!(matches!(
            extract(&adata, "CD3E", Axis::Variable),
            Err(CellframeError::ConflictingKeys(_))
        ));
        assert_eq!(
            extract(&adata, "GAPDH", Axis::Observation),
            Err(CellframeError::KeyNotFound { key: "GAPDH".into() })
        );
    }

    #[test]
    fn extract_resolved_uses_priority() {
        let adata = build(MatrixData::Dense(dense_rows()));
        let ex = Extractor::new(&adata);
        let (ns, _) = ex.extract_resolved("means").unwrap();
        assert_eq!(ns, Namespace::VarMeta);
        let (ns, col) = ex.extract_resolved("LYZ").unwrap();
        assert_eq!(ns, Namespace::VarName);
        assert_eq!(col, ColumnData::Float32(vec![0.25, 0.0, 0.0]));
    }

    #[test]
    fn batch_expressions_follow_request_order() {
        let adata = build(MatrixData::Dense(dense_rows()));
        let ex = Extractor::new(&adata);
        let cols = ex.expressions(&["LYZ", "CD3E"]).unwrap();
        assert_eq!(cols[0], vec![0.25, 0.0, 0.0]);
        assert_eq!(cols[1], vec![1.0, 0.0, 3.0]);
        assert!(ex.expressions(&["nope"]).is_err());
    }
}

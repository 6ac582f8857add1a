//! Frame construction from an [`AnnData`].
//!
//! [`build_frame`] produces one row per observation or per variable:
//!
//! 1. the identifier column (`obs_names` / `var_names`),
//! 2. every metadata column of that axis, in table order,
//! 3. optionally one column per embedding dimension (`X_umap` → `UMAP1`, `UMAP2`, …),
//! 4. each requested key that is not already a column.
//!
//! Requesting a key that is already present is a no-op.

use cellframe_core::{CellframeError, Result};
use log::{debug, warn};

use crate::extract::Extractor;
use crate::frame::{Frame, FrameBuilder};
use crate::resolve::{Axis, KeyIndex};
use crate::single_cell::{AnnData, ColumnData, Embedding, MetadataTable};

/// Options for [`build_frame`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameOptions {
    /// Axis to build along. Inferred from the keys when `None`.
    pub axis: Option<Axis>,
    /// Name of the identifier column on the observation axis.
    pub observations_name: String,
    /// Name of the identifier column on the variable axis.
    pub variables_name: String,
    /// Append one column per embedding dimension.
    pub include_dimensions: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            axis: None,
            observations_name: "Barcode".into(),
            variables_name: "Variable".into(),
            include_dimensions: false,
        }
    }
}

impl FrameOptions {
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }

    pub fn with_dimensions(mut self, include: bool) -> Self {
        self.include_dimensions = include;
        self
    }
}

/// Column name for dimension `dim` (0-based) of an embedding.
///
/// A leading `X_` is dropped and the rest upper-cased, then the 1-based
/// dimension index appended: `X_umap`, 0 → `UMAP1`.
pub fn embedding_column_name(embedding: &str, dim: usize) -> String {
    let stem = embedding.strip_prefix("X_").unwrap_or(embedding);
    format!("{}{}", stem.to_uppercase(), dim + 1)
}

/// Build a frame for `keys` along the configured or inferred axis.
///
/// The axis is seeded first (identifier, metadata, embedding dimensions), so
/// keys naming one of those columns, such as `Barcode` or `UMAP1`, are
/// satisfied without lookup. Only the remaining keys are checked against the
/// dataset namespaces.
///
/// When no axis is given it is inferred from the keys that name a dataset
/// column; identifier and dimension names take no part in inference.
///
/// # Errors
///
/// - `KeyNotFound` if a key is in no namespace and is not a seeded column.
/// - `ConflictingKeys` if the keys straddle the two axes, or a key does not
///   belong to the explicitly requested axis.
/// - `AxisRequired` if no axis is given and `keys` is empty.
/// - `AxisUnresolved` if no axis is given and none holds every key.
pub fn build_frame<S: AsRef<str>>(
    data: &AnnData,
    keys: &[S],
    options: &FrameOptions,
) -> Result<Frame> {
    let index = KeyIndex::new(data);
    let axis = match options.axis {
        Some(axis) => axis,
        None => infer_axis(&index, keys)?,
    };
    debug!(
        "building {:?} frame for {} key(s), dimensions={}",
        axis,
        keys.len(),
        options.include_dimensions
    );

    let mut builder = match axis {
        Axis::Observation => seed_axis(
            &options.observations_name,
            data.obs_names(),
            data.obs(),
            data.obsm(),
            options.include_dimensions,
        )?,
        Axis::Variable => seed_axis(
            &options.variables_name,
            data.var_names(),
            data.var(),
            data.varm(),
            options.include_dimensions,
        )?,
    };

    let mut pending: Vec<&str> = Vec::new();
    for key in keys {
        let key = key.as_ref();
        if builder.contains(key) || pending.contains(&key) {
            debug!("key '{key}' already present, skipping");
            continue;
        }
        pending.push(key);
    }
    index.check_keys_on_axis(&pending, axis)?;

    match axis {
        Axis::Observation => {
            let extractor = Extractor::with_index(data, index);
            for (key, values) in pending.iter().zip(extract_all(&extractor, &pending)?) {
                builder.push(key, ColumnData::Float32(values))?;
            }
        }
        Axis::Variable => {
            // every var column is seeded, so a key left over is not a column
            if let Some(key) = pending.first() {
                return Err(CellframeError::KeyNotFound {
                    key: key.to_string(),
                });
            }
        }
    }
    Ok(builder.finish())
}

/// Axis of a key set, judged on the keys that name a dataset column.
fn infer_axis<S: AsRef<str>>(index: &KeyIndex<'_>, keys: &[S]) -> Result<Axis> {
    let Some(first) = keys.first() else {
        return Err(CellframeError::AxisRequired);
    };
    let known: Vec<&str> = keys
        .iter()
        .map(|k| k.as_ref())
        .filter(|k| index.namespace(k).is_some())
        .collect();
    if known.is_empty() {
        return Err(CellframeError::KeyNotFound {
            key: first.as_ref().to_string(),
        });
    }
    index.check_conflicts(&known)?;
    index.resolve_axis(&known)
}

/// Observation frame: one row per cell. Keys may be `obs` columns or
/// variable names.
pub fn observations_frame<S: AsRef<str>>(
    data: &AnnData,
    keys: &[S],
    options: &FrameOptions,
) -> Result<Frame> {
    build_frame(data, keys, &options.clone().with_axis(Axis::Observation))
}

/// Variable frame: one row per gene. Keys must be `var` columns.
pub fn variables_frame<S: AsRef<str>>(
    data: &AnnData,
    keys: &[S],
    options: &FrameOptions,
) -> Result<Frame> {
    build_frame(data, keys, &options.clone().with_axis(Axis::Variable))
}

fn seed_axis(
    identifier: &str,
    names: &[String],
    table: &MetadataTable,
    embeddings: &[Embedding],
    include_dimensions: bool,
) -> Result<FrameBuilder> {
    let mut builder = FrameBuilder::default();
    builder.push(identifier, ColumnData::Strings(names.to_vec()))?;
    for (name, column) in table.iter() {
        if !builder.push(name, column.clone())? {
            warn!("metadata column '{name}' shadowed by an earlier column of the same name");
        }
    }
    if include_dimensions {
        for embedding in embeddings {
            for dim in 0..embedding.n_dims() {
                let name = embedding_column_name(embedding.name(), dim);
                let values = embedding.dimension(dim).unwrap_or_default();
                if !builder.push(&name, ColumnData::Numeric(values))? {
                    warn!("embedding column '{name}' shadowed by an earlier column of the same name");
                }
            }
        }
    }
    Ok(builder)
}

#[cfg(not(feature = "parallel"))]
fn extract_all(extractor: &Extractor<'_>, keys: &[&str]) -> Result<Vec<Vec<f32>>> {
    extractor.expressions(keys)
}

#[cfg(feature = "parallel")]
fn extract_all(extractor: &Extractor<'_>, keys: &[&str]) -> Result<Vec<Vec<f32>>> {
    use rayon::prelude::*;
    keys.par_iter().map(|key| extractor.expression(key)).collect()
}

/// Pair two key lists for multi-panel charts.
///
/// Equal lengths are zipped; a side of length 1 is repeated to the other's
/// length.
///
/// # Errors
///
/// `ConflictingLength` for any other combination.
pub fn broadcast_pairs<S: AsRef<str>, T: AsRef<str>>(
    left: &[S],
    right: &[T],
) -> Result<Vec<(String, String)>> {
    let (n, m) = (left.len(), right.len());
    let len = if n == m {
        n
    } else if n == 1 {
        m
    } else if m == 1 {
        n
    } else {
        return Err(CellframeError::ConflictingLength { left: n, right: m });
    };
    Ok((0..len)
        .map(|i| {
            let l = &left[if n == 1 { 0 } else { i }];
            let r = &right[if m == 1 { 0 } else { i }];
            (l.as_ref().to_string(), r.as_ref().to_string())
        })
        .collect())
}

/// One frame per broadcast `(x, y)` key pair.
pub fn build_pair_frames<S: AsRef<str>, T: AsRef<str>>(
    data: &AnnData,
    x: &[S],
    y: &[T],
    options: &FrameOptions,
) -> Result<Vec<Frame>> {
    broadcast_pairs(x, y)?
        .iter()
        .map(|(xi, yi)| build_frame(data, &[xi.as_str(), yi.as_str()], options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::single_cell::{DataType, MatrixData};
    use crate::sparse::SparseMatrix;
    use pretty_assertions::assert_eq;

    fn rows() -> Vec<Vec<f64>> {
        vec![vec![1.0, 0.0], vec![0.0, 2.0], vec![3.0, 4.0]]
    }

    fn bare(x: MatrixData) -> AnnData {
        AnnData::new(
            x,
            vec!["AAAC".into(), "AAAG".into(), "AAAT".into()],
            vec!["CD3E".into(), "MS4A1".into()],
        )
        .unwrap()
    }

    fn annotated() -> AnnData {
        let mut adata = bare(MatrixData::Dense(rows()));
        adata.add_obs_categorical("leiden", &["0", "1", "0"]).unwrap();
        adata.add_obs_numeric("n_genes", vec![10.0, 20.0, 30.0]).unwrap();
        adata
            .add_obsm("X_umap", vec![vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0, 5.0]])
            .unwrap();
        adata
            .add_var_column("highly_variable", ColumnData::Boolean(vec![true, false]))
            .unwrap();
        adata.add_var_numeric("means", vec![0.3, 0.6]).unwrap();
        adata.add_varm("PCs", vec![vec![0.1, 0.2], vec![0.3, 0.4]]).unwrap();
        adata
    }

    #[test]
    fn observation_column_order() {
        let adata = annotated();
        let opts = FrameOptions::default().with_dimensions(true);
        let frame = build_frame(&adata, &["MS4A1", "leiden"], &opts).unwrap();
        assert_eq!(
            frame.names(),
            vec!["Barcode", "leiden", "n_genes", "UMAP1", "UMAP2", "MS4A1"]
        );
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.column("UMAP2"), Some(&ColumnData::Numeric(vec![1.0, 3.0, 5.0])));
        assert_eq!(
            frame.column("Barcode"),
            Some(&ColumnData::Strings(vec!["AAAC".into(), "AAAG".into(), "AAAT".into()]))
        );
    }

    #[test]
    fn variable_frame() {
        let adata = annotated();
        let opts = FrameOptions::default().with_dimensions(true);
        let frame = build_frame(&adata, &["means"], &opts).unwrap();
        assert_eq!(
            frame.names(),
            vec!["Variable", "highly_variable", "means", "PCS1", "PCS2"]
        );
        assert_eq!(frame.height(), 2);
    }

    #[test]
    fn one_column_per_distinct_key() {
        let adata = bare(MatrixData::Dense(rows()));
        let frame = build_frame(&adata, &["CD3E", "MS4A1", "CD3E"], &FrameOptions::default())
            .unwrap();
        assert_eq!(frame.width(), 1 + 2);
        assert_eq!(frame.names(), vec!["Barcode", "CD3E", "MS4A1"]);
    }

    #[test]
    fn frame_matches_direct_extraction() {
        let sparse = bare(MatrixData::Sparse(SparseMatrix::from_dense(&rows(), 0.0)));
        let frame = build_frame(&sparse, &["MS4A1"], &FrameOptions::default()).unwrap();
        let direct = crate::extract::extract(&sparse, "MS4A1", Axis::Observation).unwrap();
        assert_eq!(frame.column("MS4A1"), Some(&direct));
    }

    #[test]
    fn categorical_metadata_stays_discrete() {
        let adata = annotated();
        let frame = build_frame(&adata, &["CD3E"], &FrameOptions::default()).unwrap();
        assert_eq!(frame.columns()[1].dtype(), DataType::Categorical);
    }

    #[test]
    fn metadata_only_frame_needs_axis() {
        let adata = annotated();
        let empty: [&str; 0] = [];
        assert_eq!(
            build_frame(&adata, &empty, &FrameOptions::default()),
            Err(CellframeError::AxisRequired)
        );
        let frame = observations_frame(&adata, &empty, &FrameOptions::default()).unwrap();
        assert_eq!(frame.names(), vec!["Barcode", "leiden", "n_genes"]);
        let frame = variables_frame(&adata, &empty, &FrameOptions::default()).unwrap();
        assert_eq!(frame.names(), vec!["Variable", "highly_variable", "means"]);
    }

    #[test]
    fn custom_identifier_names() {
        let adata = annotated();
        let opts = FrameOptions {
            observations_name: "cell".into(),
            ..FrameOptions::default()
        };
        let frame = build_frame(&adata, &["CD3E"], &opts).unwrap();
        assert_eq!(frame.names()[0], "cell");
    }

    #[test]
    fn build_errors() {
        let adata = annotated();
        let opts = FrameOptions::default();
        assert_eq!(
            build_frame(&adata, &["GAPDH"], &opts),
            Err(CellframeError::KeyNotFound { key: "GAPDH".into() })
        );
        assert!(matches!(
            build_frame(&adata, &["means", "CD3E"], &opts),
            Err(CellframeError::ConflictingKeys(_))
        ));
        assert!(matches!(
            build_frame(&adata, &["means"], &opts.clone().with_axis(Axis::Observation)),
            Err(CellframeError::ConflictingKeys(_))
        ));
        assert!(matches!(
            build_frame(&adata, &["CD3E"], &opts.clone().with_axis(Axis::Variable)),
            Err(CellframeError::ConflictingKeys(_))
        ));
    }

    #[test]
    fn seeded_columns_satisfy_keys() {
        let adata = annotated();
        let obs = FrameOptions::default().with_axis(Axis::Observation);

        let frame = build_frame(&adata, &["UMAP1", "CD3E"], &obs.clone().with_dimensions(true))
            .unwrap();
        assert_eq!(
            frame.names(),
            vec!["Barcode", "leiden", "n_genes", "UMAP1", "UMAP2", "CD3E"]
        );

        let frame = build_frame(&adata, &["Barcode"], &obs).unwrap();
        assert_eq!(frame.names(), vec!["Barcode", "leiden", "n_genes"]);

        // axis inferred from CD3E alone
        let frame = build_frame(
            &adata,
            &["UMAP2", "CD3E"],
            &FrameOptions::default().with_dimensions(true),
        )
        .unwrap();
        assert_eq!(frame.width(), 6);

        let frame = variables_frame(&adata, &["Variable", "means"], &FrameOptions::default())
            .unwrap();
        assert_eq!(frame.names(), vec!["Variable", "highly_variable", "means"]);

        // without dimensions UMAP1 is not a column
        assert_eq!(
            build_frame(&adata, &["UMAP1", "CD3E"], &obs),
            Err(CellframeError::KeyNotFound { key: "UMAP1".into() })
        );
    }

    #[test]
    fn embedding_names() {
        assert_eq!(embedding_column_name("X_umap", 0), "UMAP1");
        assert_eq!(embedding_column_name("X_pca", 9), "PCA10");
        assert_eq!(embedding_column_name("tsne", 1), "TSNE2");
    }

    #[test]
    fn pairs_broadcast() {
        assert_eq!(
            broadcast_pairs(&["UMAP1"], &["CD3E", "MS4A1"]).unwrap(),
            vec![
                ("UMAP1".to_string(), "CD3E".to_string()),
                ("UMAP1".to_string(), "MS4A1".to_string())
            ]
        );
        assert_eq!(broadcast_pairs(&["a", "b"], &["c", "d"]).unwrap().len(), 2);
        assert_eq!(
            broadcast_pairs(&["a", "b", "c"], &["d", "e"]),
            Err(CellframeError::ConflictingLength { left: 3, right: 2 })
        );
    }

    #[test]
    fn pair_frames() {
        let adata = annotated();
        let frames = build_pair_frames(&adata, &["n_genes"], &["CD3E", "MS4A1"], &FrameOptions::default())
            .unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[1].contains("MS4A1"));
        assert!(!frames[1].contains("CD3E"));
    }
}

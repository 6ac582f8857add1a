//! Key resolution against the namespaces of an [`AnnData`].
//!
//! A key may name an observation metadata column (`obs`), a variable
//! (`var_names`, selecting a column of `X`), or a variable metadata column
//! (`var`). [`KeyIndex`] precomputes name lookups for one dataset snapshot so
//! every resolution is a hash probe.
//!
//! Single keys resolve by priority `obs` > `var_names` > `var`. Key sets
//! infer their axis from whole-set membership, and a set that mixes `var`
//! columns with `obs` columns or variable names is rejected: those live on
//! different axes and cannot be joined row by row.

use std::collections::{HashMap, HashSet};

use cellframe_core::{CellframeError, Result};
use log::debug;

use crate::single_cell::AnnData;

/// Which axis of the dataset a frame runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// One row per observation (cell). Axis `0`.
    Observation,
    /// One row per variable (gene). Axis `1`.
    Variable,
}

impl Axis {
    /// Map the numeric axis convention (`0` observations, `1` variables).
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Axis::Observation),
            1 => Ok(Axis::Variable),
            other => Err(CellframeError::InvalidInput(format!(
                "axis must be 0 (observations) or 1 (variables), got {other}"
            ))),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Axis::Observation => 0,
            Axis::Variable => 1,
        }
    }
}

/// The namespace a key resolved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Namespace {
    /// Observation metadata column.
    ObsMeta,
    /// Variable name, i.e. an expression column of `X`.
    VarName,
    /// Variable metadata column.
    VarMeta,
}

impl Namespace {
    /// The axis a frame built from this namespace runs along.
    pub fn axis(self) -> Axis {
        match self {
            Namespace::ObsMeta | Namespace::VarName => Axis::Observation,
            Namespace::VarMeta => Axis::Variable,
        }
    }
}

/// Precomputed name → namespace lookups for one dataset snapshot.
#[derive(Debug, Clone)]
pub struct KeyIndex<'a> {
    obs_meta: HashSet<&'a str>,
    var_names: HashMap<&'a str, usize>,
    var_meta: HashSet<&'a str>,
}

impl<'a> KeyIndex<'a> {
    pub fn new(data: &'a AnnData) -> Self {
        Self {
            obs_meta: data.obs().names().collect(),
            var_names: data
                .var_names()
                .iter()
                .enumerate()
                .map(|(i, n)| (n.as_str(), i))
                .collect(),
            var_meta: data.var().names().collect(),
        }
    }

    pub fn is_obs_meta(&self, key: &str) -> bool {
        self.obs_meta.contains(key)
    }

    pub fn is_var_name(&self, key: &str) -> bool {
        self.var_names.contains_key(key)
    }

    pub fn is_var_meta(&self, key: &str) -> bool {
        self.var_meta.contains(key)
    }

    /// Column index of a variable in `X`.
    pub fn var_index(&self, key: &str) -> Option<usize> {
        self.var_names.get(key).copied()
    }

    /// Whether `key` belongs to the observation axis (`obs` or `var_names`).
    pub fn is_observation_feature(&self, key: &str) -> bool {
        self.is_obs_meta(key) || self.is_var_name(key)
    }

    /// First matching namespace in priority order `obs`, `var_names`, `var`.
    pub fn namespace(&self, key: &str) -> Option<Namespace> {
        if self.is_obs_meta(key) {
            Some(Namespace::ObsMeta)
        } else if self.is_var_name(key) {
            Some(Namespace::VarName)
        } else if self.is_var_meta(key) {
            Some(Namespace::VarMeta)
        } else {
            None
        }
    }

    /// Like [`namespace`](Self::namespace), failing with `KeyNotFound`.
    pub fn resolve_key(&self, key: &str) -> Result<Namespace> {
        self.namespace(key).ok_or_else(|| CellframeError::KeyNotFound {
            key: key.to_string(),
        })
    }

    /// Infer the axis a key set runs along.
    ///
    /// All keys in `var` → [`Axis::Variable`]; otherwise all keys in `obs` or
    /// `var_names` → [`Axis::Observation`]; otherwise `AxisUnresolved`.
    pub fn resolve_axis<S: AsRef<str>>(&self, keys: &[S]) -> Result<Axis> {
        if keys.is_empty() {
            return Err(CellframeError::AxisRequired);
        }
        let axis = if keys.iter().all(|k| self.is_var_meta(k.as_ref())) {
            Axis::Variable
        } else if keys.iter().all(|k| self.is_observation_feature(k.as_ref())) {
            Axis::Observation
        } else {
            return Err(CellframeError::AxisUnresolved {
                keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
            });
        };
        debug!("resolved axis {:?} for {} key(s)", axis, keys.len());
        Ok(axis)
    }

    /// Reject unknown keys and key sets that straddle the two axes.
    ///
    /// A key found in no namespace fails with `KeyNotFound`. A key present in
    /// `var` as well as in `obs` or `var_names` is ambiguous about its axis and
    /// fails with `ConflictingKeys`; give the axis explicitly to build such a
    /// frame. A `var` key combined with any `obs` or `var_names` key fails with
    /// `ConflictingKeys`.
    pub fn check_conflicts<S: AsRef<str>>(&self, keys: &[S]) -> Result<()> {
        let mut seen: HashSet<Namespace> = HashSet::with_capacity(3);
        for key in keys {
            let key = key.as_ref();
            let ns = self.resolve_key(key)?;
            if ns != Namespace::VarMeta && self.is_var_meta(key) {
                return Err(CellframeError::ConflictingKeys(format!(
                    "key '{key}' exists both in var and in {}; specify the axis explicitly",
                    if ns == Namespace::ObsMeta { "obs" } else { "var_names" }
                )));
            }
            seen.insert(ns);
        }
        if seen.contains(&Namespace::VarMeta)
            && (seen.contains(&Namespace::VarName) || seen.contains(&Namespace::ObsMeta))
        {
            return Err(CellframeError::ConflictingKeys(
                "keys from var and var_names or obs cannot be used together".into(),
            ));
        }
        Ok(())
    }

    /// Check every key against the namespaces of a fixed axis.
    ///
    /// A key that exists only on the other axis fails with `ConflictingKeys`;
    /// a key that exists nowhere fails with `KeyNotFound`.
    pub fn check_keys_on_axis<S: AsRef<str>>(&self, keys: &[S], axis: Axis) -> Result<()> {
        for key in keys {
            let key = key.as_ref();
            let on_axis = match axis {
                Axis::Observation => self.is_observation_feature(key),
                Axis::Variable => self.is_var_meta(key),
            };
            if on_axis {
                continue;
            }
            return match self.namespace(key) {
                Some(ns) => Err(CellframeError::ConflictingKeys(format!(
                    "key '{key}' belongs to the {:?} axis, not {:?}",
                    ns.axis(),
                    axis
                ))),
                None => Err(CellframeError::KeyNotFound {
                    key: key.to_string(),
                }),
            };
        }
        Ok(())
    }
}

/// Infer the axis of a key set. See [`KeyIndex::resolve_axis`].
pub fn resolve_axis<S: AsRef<str>>(data: &AnnData, keys: &[S]) -> Result<Axis> {
    KeyIndex::new(data).resolve_axis(keys)
}

/// Validate a key set. See [`KeyIndex::check_conflicts`].
pub fn check_conflicts<S: AsRef<str>>(data: &AnnData, keys: &[S]) -> Result<()> {
    KeyIndex::new(data).check_conflicts(keys)
}

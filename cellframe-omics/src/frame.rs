//! Flat, chart-ready tables.
//!
//! A [`Frame`] is an ordered collection of equal-length named columns. Frames
//! are assembled through a [`FrameBuilder`] and never change afterwards;
//! operations such as [`Frame::with_column`] and [`Frame::select`] return a new
//! frame.

use cellframe_core::{CellframeError, Result, Summarizable};

use crate::single_cell::{ColumnData, DataType};

/// A named column of a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// An immutable table of equal-length named columns in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    height: usize,
}

impl Frame {
    /// Start building a frame.
    pub fn builder() -> FrameBuilder {
        FrameBuilder::default()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Look up a column's data by name.
    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    /// Look up a column by name, failing with `KeyNotFound`.
    pub fn require(&self, name: &str) -> Result<&ColumnData> {
        self.column(name).ok_or_else(|| CellframeError::KeyNotFound {
            key: name.to_string(),
        })
    }

    /// A new frame with `data` appended as column `name`.
    ///
    /// Replaces nothing: an existing column of the same name is an error.
    pub fn with_column(&self, name: &str, data: ColumnData) -> Result<Frame> {
        let mut builder = FrameBuilder::from_frame(self);
        if !builder.push(name, data)? {
            return Err(CellframeError::InvalidInput(format!(
                "column '{name}' already present in frame"
            )));
        }
        Ok(builder.finish())
    }

    /// Project onto the named columns, in the order given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Frame> {
        let mut builder = FrameBuilder::default();
        for name in names {
            let name = name.as_ref();
            let data = self.require(name)?;
            builder.push(name, data.clone())?;
        }
        Ok(builder.finish())
    }

    /// Keep only the rows at `indices`, in the order given.
    pub fn take(&self, indices: &[usize]) -> Result<Frame> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.height) {
            return Err(CellframeError::InvalidInput(format!(
                "row index {bad} out of bounds (height={})",
                self.height
            )));
        }
        let mut builder = FrameBuilder::default();
        for col in &self.columns {
            builder.push(&col.name, col.data.subset(indices))?;
        }
        Ok(builder.finish())
    }

    /// Export as an array of JSON records, one object per row.
    ///
    /// Categorical and string values are written as JSON strings, numbers as
    /// JSON numbers (`NaN` and missing values as `null`).
    #[cfg(feature = "serde")]
    pub fn to_json_records(&self) -> serde_json::Value {
        use serde_json::{Map, Value};

        let number = |x: f64| {
            serde_json::Number::from_f64(x).map_or(Value::Null, Value::Number)
        };
        let rows = (0..self.height)
            .map(|i| {
                let mut record = Map::with_capacity(self.columns.len());
                for col in &self.columns {
                    let value = match &col.data {
                        ColumnData::Numeric(v) => number(v[i]),
                        ColumnData::Float32(v) => number(f64::from(v[i])),
                        ColumnData::Boolean(v) => Value::Bool(v[i]),
                        ColumnData::Strings(_) | ColumnData::Categorical { .. } => {
                            col.data.label(i).map_or(Value::Null, Value::String)
                        }
                    };
                    record.insert(col.name.clone(), value);
                }
                Value::Object(record)
            })
            .collect();
        Value::Array(rows)
    }
}

impl Summarizable for Frame {
    fn summary(&self) -> String {
        format!(
            "Frame: {} rows \u{00d7} {} columns [{}]",
            self.height,
            self.columns.len(),
            self.names().join(", ")
        )
    }
}

/// Accumulates `(name, column)` pairs and materializes a [`Frame`].
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
    columns: Vec<Column>,
    height: Option<usize>,
}

impl FrameBuilder {
    /// Seed a builder with the columns of an existing frame.
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            columns: frame.columns.clone(),
            height: (!frame.columns.is_empty()).then_some(frame.height),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Append a column.
    ///
    /// Returns `Ok(false)` without appending when a column of that name is
    /// already present. The first column fixes the frame height; later columns
    /// must match it.
    pub fn push(&mut self, name: &str, data: ColumnData) -> Result<bool> {
        if self.contains(name) {
            return Ok(false);
        }
        match self.height {
            Some(h) if h != data.len() => {
                return Err(CellframeError::InvalidInput(format!(
                    "column '{}' length ({}) does not match frame height ({})",
                    name,
                    data.len(),
                    h
                )));
            }
            Some(_) => {}
            None => self.height = Some(data.len()),
        }
        self.columns.push(Column::new(name, data));
        Ok(true)
    }

    pub fn finish(self) -> Frame {
        Frame {
            height: self.height.unwrap_or(0),
            columns: self.columns,
        }
    }
}

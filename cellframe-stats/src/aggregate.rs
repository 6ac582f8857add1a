//! Group-by statistics over a wide frame.
//!
//! [`aggregate`] first [`unpivot`]s the value columns into a long frame
//! (`group`, `variable`, `value`), then reduces every `(group, variable)` pair
//! to the configured [`Statistic`]s. Rows come out with groups as the outer
//! order and value columns as the inner order.
//!
//! Group order is the category order of a categorical group column, or order
//! of first appearance otherwise. `NaN` values are missing: they count towards
//! neither the numerator nor the denominator of any statistic.

use std::cmp::Ordering;
use std::collections::HashMap;

use cellframe_core::{CellframeError, Result};
use cellframe_omics::{
    observations_frame, AnnData, ColumnData, Frame, FrameBuilder, FrameOptions,
};
use log::{debug, trace, warn};

/// A per-group statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Statistic {
    /// Arithmetic mean of the group's values.
    Mean,
    /// Sum of the group's values.
    Sum,
    /// `100 × count(value > threshold) / count(value)`.
    ///
    /// The denominator is the number of non-missing values in the group, so a
    /// `NaN` row lowers neither side of the ratio. A group of `[NaN, 0, 4]`
    /// with threshold `1` reports `50`, not `33.3`.
    Percentage,
}

/// Order of the groups in an aggregation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupOrder {
    /// Category order, or first appearance for non-categorical columns.
    #[default]
    Natural,
    /// Order by the integer value of each label when every label is an
    /// integer (`"2" < "10"`). Falls back to natural order otherwise.
    NumericLabels { descending: bool },
}

/// A stable row sort of an aggregation result.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortSpec {
    /// Columns to sort by, most significant first.
    pub by: Vec<String>,
    pub descending: bool,
}

impl SortSpec {
    pub fn new<S: AsRef<str>>(by: &[S]) -> Self {
        Self {
            by: by.iter().map(|s| s.as_ref().to_string()).collect(),
            descending: false,
        }
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }
}

/// Configuration for [`aggregate`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AggregateConfig {
    /// Column whose labels define the groups.
    pub group_by: String,
    /// Values strictly greater than this count towards the percentage.
    pub threshold: f64,
    /// Statistic columns to emit, in this order.
    pub statistics: Vec<Statistic>,
    /// Name of the column holding the original value-column names.
    pub variable_name: String,
    /// Name of the long-format value column.
    pub value_name: String,
    pub mean_name: String,
    pub sum_name: String,
    pub percentage_name: String,
    pub order: GroupOrder,
    /// Optional stable sort applied last. No sorting when `None`.
    pub sort: Option<SortSpec>,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            group_by: String::new(),
            threshold: 0.0,
            statistics: vec![Statistic::Mean, Statistic::Percentage],
            variable_name: "variable".into(),
            value_name: "value".into(),
            mean_name: "mean".into(),
            sum_name: "sum".into(),
            percentage_name: "percentage".into(),
            order: GroupOrder::Natural,
            sort: None,
        }
    }
}

impl AggregateConfig {
    /// Default configuration grouping by `group_by`.
    pub fn new(group_by: &str) -> Self {
        Self {
            group_by: group_by.to_string(),
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_statistics(mut self, statistics: &[Statistic]) -> Self {
        self.statistics = statistics.to_vec();
        self
    }

    pub fn with_order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Output column name of a statistic.
    pub fn statistic_name(&self, statistic: Statistic) -> &str {
        match statistic {
            Statistic::Mean => &self.mean_name,
            Statistic::Sum => &self.sum_name,
            Statistic::Percentage => &self.percentage_name,
        }
    }
}

/// Reshape `frame` from wide to long on the columns `on`.
///
/// Every other column is kept as an index column and repeated once per value
/// column. The result stacks one block of `frame.height()` rows per value
/// column, with `variable_name` holding the source column name (categorical,
/// in the order of `on`) and `value_name` holding the values as `f64`.
///
/// # Errors
///
/// - `InvalidInput` if `on` is empty or an output name collides with an index
///   column.
/// - `KeyNotFound` if a column of `on` is absent.
/// - `Type` if a column of `on` is not numeric or boolean.
pub fn unpivot<S: AsRef<str>>(
    frame: &Frame,
    on: &[S],
    variable_name: &str,
    value_name: &str,
) -> Result<Frame> {
    let on = distinct(on);
    if on.is_empty() {
        return Err(CellframeError::InvalidInput(
            "unpivot needs at least one value column".into(),
        ));
    }
    if variable_name == value_name {
        return Err(CellframeError::InvalidInput(format!(
            "variable and value columns are both named '{variable_name}'"
        )));
    }

    let mut values = Vec::with_capacity(on.len() * frame.height());
    for &name in &on {
        let column = frame.require(name)?;
        let widened = column.to_f64().ok_or_else(|| {
            CellframeError::Type(format!(
                "column '{name}' is {:?}, expected numeric values",
                column.dtype()
            ))
        })?;
        values.extend(widened);
    }

    let index: Vec<_> = frame
        .columns()
        .iter()
        .filter(|c| !on.contains(&c.name()))
        .collect();
    if let Some(clash) = index
        .iter()
        .find(|c| c.name() == variable_name || c.name() == value_name)
    {
        return Err(CellframeError::InvalidInput(format!(
            "unpivot output column '{}' collides with an index column",
            clash.name()
        )));
    }

    let height = frame.height();
    let repeated: Vec<usize> = (0..on.len()).flat_map(|_| 0..height).collect();
    let codes: Vec<i32> = (0..on.len())
        .flat_map(|k| std::iter::repeat(k as i32).take(height))
        .collect();

    let mut builder = FrameBuilder::default();
    for column in index {
        builder.push(column.name(), column.data().subset(&repeated))?;
    }
    builder.push(
        variable_name,
        ColumnData::Categorical {
            codes,
            categories: on.iter().map(|s| s.to_string()).collect(),
        },
    )?;
    builder.push(value_name, ColumnData::Numeric(values))?;
    Ok(builder.finish())
}

/// Per-group statistics of `value_keys`, grouped by `config.group_by`.
///
/// Output columns: the group column (same type as the input), the variable
/// column, then one column per configured statistic. A `(group, variable)`
/// pair with no non-missing values is omitted. Rows whose group label is
/// missing are ignored.
///
/// # Errors
///
/// - `KeyNotFound` if the group column or a value column is absent.
/// - `Type` if a value column is not numeric.
/// - `InvalidInput` if no statistic is requested, the group column is also a
///   value column, or output column names collide.
pub fn aggregate<S: AsRef<str>>(
    frame: &Frame,
    value_keys: &[S],
    config: &AggregateConfig,
) -> Result<Frame> {
    let group_by = config.group_by.as_str();
    let statistics = distinct_statistics(&config.statistics);
    if statistics.is_empty() {
        return Err(CellframeError::InvalidInput(
            "aggregate needs at least one statistic".into(),
        ));
    }
    frame.require(group_by)?;
    let keys = distinct(value_keys);
    if keys.contains(&group_by) {
        return Err(CellframeError::InvalidInput(format!(
            "group column '{group_by}' cannot also be a value column"
        )));
    }

    let mut projection = Vec::with_capacity(keys.len() + 1);
    projection.push(group_by);
    projection.extend(keys.iter().copied());
    let long = unpivot(
        &frame.select(&projection)?,
        &keys,
        &config.variable_name,
        &config.value_name,
    )?;

    let groups = long.require(group_by)?;
    let variables = match long.require(&config.variable_name)? {
        ColumnData::Categorical { codes, .. } => codes,
        other => {
            return Err(CellframeError::Type(format!(
                "variable column is {:?}, expected categorical",
                other.dtype()
            )))
        }
    };
    let values = long
        .require(&config.value_name)?
        .as_numeric()
        .ok_or_else(|| CellframeError::Type("value column is not numeric".into()))?;

    let mut grouping = Grouping::of(groups);
    grouping.apply_order(config.order);
    debug!(
        "aggregating {} column(s) over {} group(s) of '{}'",
        keys.len(),
        grouping.len(),
        group_by
    );

    let mut representatives = Vec::new();
    let mut out_variables = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); statistics.len()];
    for (label, rows) in grouping.iter() {
        let mut accumulators = vec![Accumulator::default(); keys.len()];
        for &row in rows {
            accumulators[variables[row] as usize].add(values[row], config.threshold);
        }
        for (k, acc) in accumulators.iter().enumerate() {
            if acc.count == 0 {
                warn!(
                    "dropping group '{}' for '{}': no non-missing values",
                    label, keys[k]
                );
                continue;
            }
            representatives.push(rows[0]);
            out_variables.push(k as i32);
            for (column, &statistic) in columns.iter_mut().zip(&statistics) {
                column.push(acc.statistic(statistic));
            }
        }
    }

    let mut builder = FrameBuilder::default();
    builder.push(group_by, groups.subset(&representatives))?;
    let names = std::iter::once(config.variable_name.as_str())
        .chain(statistics.iter().map(|&s| config.statistic_name(s)));
    let data = std::iter::once(ColumnData::Categorical {
        codes: out_variables,
        categories: keys.iter().map(|s| s.to_string()).collect(),
    })
    .chain(columns.into_iter().map(ColumnData::Numeric));
    for (name, column) in names.zip(data) {
        if !builder.push(name, column)? {
            return Err(CellframeError::InvalidInput(format!(
                "output column name '{name}' is used twice"
            )));
        }
    }
    let result = builder.finish();

    match &config.sort {
        Some(spec) => sort_frame(&result, spec),
        None => Ok(result),
    }
}

/// Stable sort of the rows of `frame` by the columns of `spec`.
///
/// Numbers compare numerically (`NaN` last), categorical columns by category
/// order, strings lexicographically. Equal rows keep their relative order,
/// also when sorting descending.
pub fn sort_frame(frame: &Frame, spec: &SortSpec) -> Result<Frame> {
    let keys = spec
        .by
        .iter()
        .map(|name| frame.require(name))
        .collect::<Result<Vec<_>>>()?;
    let mut order: Vec<usize> = (0..frame.height()).collect();
    order.sort_by(|&a, &b| {
        let ord = keys
            .iter()
            .map(|column| compare_rows(column, a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal);
        if spec.descending {
            ord.reverse()
        } else {
            ord
        }
    });
    frame.take(&order)
}

/// Observation frame for `keys` aggregated by the `group_by` metadata column.
///
/// This is the table behind a dot plot: one row per `(group, key)` with mean
/// and percentage columns (plus sum when configured). `config.group_by` is
/// replaced by `group_by`.
pub fn dotplot_frame<S: AsRef<str>>(
    data: &AnnData,
    keys: &[S],
    group_by: &str,
    config: &AggregateConfig,
) -> Result<Frame> {
    if data.get_obs(group_by).is_none() {
        return Err(CellframeError::KeyNotFound {
            key: group_by.to_string(),
        });
    }
    let frame = observations_frame(data, keys, &FrameOptions::default())?;
    let config = AggregateConfig {
        group_by: group_by.to_string(),
        ..config.clone()
    };
    aggregate(&frame, keys, &config)
}

// ── Internal ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: usize,
    above: usize,
    sum: f64,
}

impl Accumulator {
    fn add(&mut self, value: f64, threshold: f64) {
        if value.is_nan() {
            return;
        }
        self.count += 1;
        self.sum += value;
        if value > threshold {
            self.above += 1;
        }
    }

    fn statistic(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::Mean => self.sum / self.count as f64,
            Statistic::Sum => self.sum,
            Statistic::Percentage => 100.0 * self.above as f64 / self.count as f64,
        }
    }
}

/// Row indices of each distinct label of a column, in group order.
#[derive(Debug, Clone)]
pub(crate) struct Grouping {
    labels: Vec<String>,
    rows: Vec<Vec<usize>>,
}

impl Grouping {
    /// Group the rows of `column`. Categorical columns follow category order
    /// and drop unused categories; other columns follow first appearance.
    pub(crate) fn of(column: &ColumnData) -> Self {
        let mut grouping = match column {
            ColumnData::Categorical { codes, categories } => {
                let mut rows = vec![Vec::new(); categories.len()];
                for (i, &code) in codes.iter().enumerate() {
                    if let Some(slot) = usize::try_from(code).ok().and_then(|c| rows.get_mut(c)) {
                        slot.push(i);
                    }
                }
                Grouping {
                    labels: categories.clone(),
                    rows,
                }
            }
            _ => {
                let mut slots: HashMap<String, usize> = HashMap::new();
                let mut grouping = Grouping {
                    labels: Vec::new(),
                    rows: Vec::new(),
                };
                for i in 0..column.len() {
                    let Some(label) = column.label(i) else {
                        continue;
                    };
                    let slot = *slots.entry(label.clone()).or_insert_with(|| {
                        grouping.labels.push(label);
                        grouping.rows.push(Vec::new());
                        grouping.rows.len() - 1
                    });
                    grouping.rows[slot].push(i);
                }
                grouping
            }
        };
        grouping.drop_empty();
        grouping
    }

    pub(crate) fn len(&self) -> usize {
        self.labels.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.rows.iter().map(Vec::as_slice))
    }

    pub(crate) fn apply_order(&mut self, order: GroupOrder) {
        let GroupOrder::NumericLabels { descending } = order else {
            return;
        };
        let Ok(numbers) = self
            .labels
            .iter()
            .map(|l| l.trim().parse::<i64>())
            .collect::<std::result::Result<Vec<_>, _>>()
        else {
            trace!("group labels are not all integers, keeping natural order");
            return;
        };
        let mut permutation: Vec<usize> = (0..self.labels.len()).collect();
        permutation.sort_by_key(|&i| numbers[i]);
        if descending {
            permutation.reverse();
        }
        self.labels = permutation.iter().map(|&i| self.labels[i].clone()).collect();
        self.rows = permutation.iter().map(|&i| self.rows[i].clone()).collect();
    }

    fn drop_empty(&mut self) {
        let mut labels = Vec::with_capacity(self.labels.len());
        let mut rows = Vec::with_capacity(self.rows.len());
        for (label, members) in self.labels.drain(..).zip(self.rows.drain(..)) {
            if members.is_empty() {
                trace!("group '{label}' has no rows");
                continue;
            }
            labels.push(label);
            rows.push(members);
        }
        self.labels = labels;
        self.rows = rows;
    }
}

fn compare_rows(column: &ColumnData, a: usize, b: usize) -> Ordering {
    match column {
        ColumnData::Numeric(v) => nan_last(v[a], v[b]),
        ColumnData::Float32(v) => nan_last(f64::from(v[a]), f64::from(v[b])),
        ColumnData::Boolean(v) => v[a].cmp(&v[b]),
        ColumnData::Strings(v) => v[a].cmp(&v[b]),
        ColumnData::Categorical { codes, .. } => codes[a].cmp(&codes[b]),
    }
}

fn nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

fn distinct<S: AsRef<str>>(keys: &[S]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::with_capacity(keys.len());
    for key in keys {
        let key = key.as_ref();
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}

fn distinct_statistics(statistics: &[Statistic]) -> Vec<Statistic> {
    let mut out = Vec::with_capacity(statistics.len());
    for &s in statistics {
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

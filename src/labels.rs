// Bin positions and dense class ids are usize -> f64 / i64 conversions on
// dataset-sized values
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

//! Label resolution and discretization for stratification.
//!
//! Turns a raw Arrow label array into dense class ids:
//!
//! - classification labels are mapped to the index of their value among the
//!   sorted distinct values,
//! - regression labels are cut into `n_bin` equal-frequency quantile bins.
//!
//! # Example
//!
//! ```
//! use arrow::array::Float64Array;
//! use molsplit::labels::{LabelValues, TaskType};
//!
//! let raw = Float64Array::from((0..8).map(f64::from).collect::<Vec<_>>());
//! let values = LabelValues::from_array(&raw, 0).unwrap();
//! let classes = values.discretize(TaskType::Infer, 4).unwrap();
//! assert_eq!(classes.counts(), vec![2, 2, 2, 2]);
//! ```

use std::{fmt, str::FromStr};

use arrow::{
    array::{Array, AsArray, UInt64Array},
    compute::take,
    datatypes::{
        DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
        UInt16Type, UInt32Type, UInt64Type, UInt8Type,
    },
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which dataset column holds the labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelColumn {
    /// The last column of the dataset.
    #[default]
    Last,
    /// Column at a zero-based position.
    Index(usize),
    /// Column with the given name.
    Name(String),
}

/// How labels are turned into strata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Classification for integer labels, regression for float labels.
    #[default]
    Infer,
    /// Each distinct label value is its own class.
    Classification,
    /// Labels are binned into equal-frequency quantile buckets.
    Regression,
}

impl TaskType {
    /// Returns the lowercase name used in configs and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infer => "infer",
            Self::Classification => "classification",
            Self::Regression => "regression",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "infer" => Ok(Self::Infer),
            "classification" => Ok(Self::Classification),
            "regression" => Ok(Self::Regression),
            other => Err(Error::invalid_argument(format!(
                "task type '{other}' is invalid; use 'classification', 'regression' or 'infer'"
            ))),
        }
    }
}

/// Raw label values for one task, one per dataset row.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelValues {
    /// Integral labels.
    Integer(Vec<i64>),
    /// Floating point labels.
    Float(Vec<f64>),
}

macro_rules! primitive_values {
    ($array:expr, $ty:ty) => {
        $array
            .as_primitive_opt::<$ty>()
            .ok_or_else(|| {
                Error::invalid_argument(concat!("failed to read labels as ", stringify!($ty)))
            })?
            .values()
    };
}

impl LabelValues {
    /// Reads labels from an Arrow array.
    ///
    /// A `FixedSizeList` array holds several tasks per row; element
    /// `task_index` of every row is used. For flat arrays `task_index` is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for null labels, an out-of-range
    /// `task_index`, `UInt64` values above `i64::MAX`, or a type that is
    /// neither integral nor floating point.
    pub fn from_array(array: &dyn Array, task_index: usize) -> Result<Self> {
        if array.null_count() > 0 {
            return Err(Error::invalid_argument(format!(
                "labels contain {} null values",
                array.null_count()
            )));
        }

        let values = match array.data_type() {
            DataType::FixedSizeList(_, width) => {
                return Self::select_task(array, *width as usize, task_index)
            }
            DataType::Int8 => Self::integers(primitive_values!(array, Int8Type).iter()),
            DataType::Int16 => Self::integers(primitive_values!(array, Int16Type).iter()),
            DataType::Int32 => Self::integers(primitive_values!(array, Int32Type).iter()),
            DataType::Int64 => Self::Integer(primitive_values!(array, Int64Type).to_vec()),
            DataType::UInt8 => Self::integers(primitive_values!(array, UInt8Type).iter()),
            DataType::UInt16 => Self::integers(primitive_values!(array, UInt16Type).iter()),
            DataType::UInt32 => Self::integers(primitive_values!(array, UInt32Type).iter()),
            DataType::UInt64 => Self::Integer(
                primitive_values!(array, UInt64Type)
                    .iter()
                    .map(|&v| {
                        i64::try_from(v).map_err(|_| {
                            Error::invalid_argument(format!("label {v} does not fit in i64"))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            DataType::Float32 => Self::Float(
                primitive_values!(array, Float32Type)
                    .iter()
                    .map(|&v| f64::from(v))
                    .collect(),
            ),
            DataType::Float64 => Self::Float(primitive_values!(array, Float64Type).to_vec()),
            dt => {
                return Err(Error::invalid_argument(format!(
                    "unsupported label type for stratification: {dt}"
                )))
            }
        };

        Ok(values)
    }

    fn integers<'a, T: Copy + Into<i64> + 'a>(values: impl Iterator<Item = &'a T>) -> Self {
        Self::Integer(values.map(|&v| v.into()).collect())
    }

    fn select_task(array: &dyn Array, width: usize, task_index: usize) -> Result<Self> {
        if task_index >= width {
            return Err(Error::invalid_argument(format!(
                "task index {task_index} out of range for {width} tasks"
            )));
        }
        let list = array
            .as_fixed_size_list_opt()
            .ok_or_else(|| Error::invalid_argument("failed to read multi-task labels"))?;
        if matches!(list.value_type(), DataType::FixedSizeList(_, _)) {
            return Err(Error::invalid_argument(
                "labels must be at most two-dimensional",
            ));
        }

        let positions = UInt64Array::from_iter_values(
            (0..list.len()).map(|row| (list.value_offset(row) as usize + task_index) as u64),
        );
        let column = take(list.values().as_ref(), &positions, None)?;
        Self::from_array(column.as_ref(), 0)
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        match self {
            Self::Integer(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    /// Returns true if there are no labels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves [`TaskType::Infer`] from the label type.
    ///
    /// Explicit task types are returned unchanged.
    pub fn infer_task_type(&self, task_type: TaskType) -> TaskType {
        match (task_type, self) {
            (TaskType::Infer, Self::Integer(_)) => TaskType::Classification,
            (TaskType::Infer, Self::Float(_)) => TaskType::Regression,
            (explicit, _) => explicit,
        }
    }

    /// Maps every label to a dense class id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for NaN labels, `n_bin == 0`,
    /// more regression bins than labels, or quantile bin edges that are not
    /// unique.
    pub fn discretize(&self, task_type: TaskType, n_bin: usize) -> Result<Classes> {
        match self.infer_task_type(task_type) {
            TaskType::Regression => {
                let values = self.as_f64()?;
                quantile_bins(&values, n_bin)
            }
            TaskType::Classification | TaskType::Infer => match self {
                Self::Integer(values) => Ok(distinct_classes(values, i64::cmp, |v| v.to_string())),
                Self::Float(_) => {
                    let values = self.as_f64()?;
                    Ok(distinct_classes(&values, f64::total_cmp, |v| v.to_string()))
                }
            },
        }
    }

    /// Labels as `f64`, with `-0.0` folded into `0.0`.
    fn as_f64(&self) -> Result<Vec<f64>> {
        let values: Vec<f64> = match self {
            Self::Integer(v) => v.iter().map(|&x| x as f64).collect(),
            Self::Float(v) => v.iter().map(|&x| if x == 0.0 { 0.0 } else { x }).collect(),
        };
        if let Some(pos) = values.iter().position(|v| v.is_nan()) {
            return Err(Error::invalid_argument(format!("label at row {pos} is NaN")));
        }
        Ok(values)
    }
}

/// Dense class assignment for every row.
#[derive(Debug, Clone, PartialEq)]
pub struct Classes {
    assignments: Vec<usize>,
    names: Vec<String>,
}

impl Classes {
    /// Class id of every row, in row order.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Number of classes (K). Some classes may be empty for regression.
    pub fn n_classes(&self) -> usize {
        self.names.len()
    }

    /// Human readable name of each class: the label value for
    /// classification, the bin interval for regression.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Population of each class.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes()];
        for &class in &self.assignments {
            counts[class] += 1;
        }
        counts
    }

    /// Row indices of each class, ascending within a class.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.n_classes()];
        for (row, &class) in self.assignments.iter().enumerate() {
            groups[class].push(row);
        }
        groups
    }
}

fn distinct_classes<T: Copy>(
    values: &[T],
    cmp: impl Fn(&T, &T) -> std::cmp::Ordering,
    name: impl Fn(&T) -> String,
) -> Classes {
    let mut distinct = values.to_vec();
    distinct.sort_by(&cmp);
    distinct.dedup_by(|a, b| cmp(a, b).is_eq());

    let assignments = values
        .iter()
        .map(|v| {
            // every value is present in `distinct`
            distinct
                .binary_search_by(|probe| cmp(probe, v))
                .unwrap_or_else(|pos| pos)
        })
        .collect();

    Classes {
        assignments,
        names: distinct.iter().map(name).collect(),
    }
}

/// Cuts `values` into `n_bin` equal-frequency bins.
///
/// Edges are the linearly interpolated quantiles at `k / n_bin`. A value
/// `v` lands in bin `i` when `edge[i] < v <= edge[i + 1]`; the minimum goes
/// to bin 0. Asking for more bins than values is an error.
fn quantile_bins(values: &[f64], n_bin: usize) -> Result<Classes> {
    if n_bin == 0 {
        return Err(Error::invalid_argument("n_bin must be at least 1"));
    }
    if values.is_empty() {
        return Ok(Classes {
            assignments: Vec::new(),
            names: Vec::new(),
        });
    }
    if n_bin > values.len() {
        return Err(Error::invalid_argument(format!(
            "n_bin {n_bin} exceeds the {} regression labels",
            values.len()
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let last = sorted.len() - 1;
    let edges: Vec<f64> = (0..=n_bin)
        .map(|k| {
            let scaled = k * last;
            let lo = scaled / n_bin;
            let rem = scaled % n_bin;
            if rem == 0 {
                sorted[lo]
            } else {
                let frac = rem as f64 / n_bin as f64;
                sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
            }
        })
        .collect();

    if let Some(pair) = edges.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(Error::invalid_argument(format!(
            "quantile bin edges are not unique (duplicate edge {}); use fewer than {n_bin} bins",
            pair[1]
        )));
    }

    let assignments = values
        .iter()
        .map(|&v| edges[1..].partition_point(|&e| e < v).min(n_bin - 1))
        .collect();
    let names = edges
        .windows(2)
        .map(|pair| format!("({}, {}]", pair[0], pair[1]))
        .collect();

    Ok(Classes { assignments, names })
}

// Allow casts for size calculations - these are intentional and safe for
// dataset sizes
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

//! Dataset splitting utilities
//!
//! Provides stratified train/validation/test splitting for classification
//! and (binned) regression labels.
//!
//! # Example
//!
//! ```ignore
//! use molsplit::split::{SplitFractions, Splitter, StratifiedSplitter};
//!
//! let splitter = StratifiedSplitter::new().seed(42);
//!
//! // Three-way split on the last column
//! let split = splitter.train_valid_test_split(&dataset, SplitFractions::default(), None)?;
//!
//! // Two-way split, materialized
//! let (train, valid) = splitter.train_valid_datasets(&dataset, 0.9, 0.1, None)?;
//! ```

use arrow::array::Array;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    apportion::apportion,
    dataset::{ArrowDataset, Dataset},
    error::{Error, Result},
    labels::{LabelColumn, LabelValues, TaskType},
};

/// Maximum distance of the fraction sum from 1.0.
pub const FRACTION_TOLERANCE: f64 = 1.5e-7;

/// Train/validation/test fractions, validated to sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFractions", into = "RawFractions")]
pub struct SplitFractions {
    train: f64,
    valid: f64,
    test: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawFractions {
    #[serde(default = "default_frac_train")]
    frac_train: f64,
    #[serde(default = "default_frac_side")]
    frac_valid: f64,
    #[serde(default = "default_frac_side")]
    frac_test: f64,
}

fn default_frac_train() -> f64 {
    0.8
}

fn default_frac_side() -> f64 {
    0.1
}

impl TryFrom<RawFractions> for SplitFractions {
    type Error = Error;

    fn try_from(raw: RawFractions) -> Result<Self> {
        Self::new(raw.frac_train, raw.frac_valid, raw.frac_test)
    }
}

impl From<SplitFractions> for RawFractions {
    fn from(f: SplitFractions) -> Self {
        Self {
            frac_train: f.train,
            frac_valid: f.valid,
            frac_test: f.test,
        }
    }
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            train: 0.8,
            valid: 0.1,
            test: 0.1,
        }
    }
}

impl SplitFractions {
    /// Creates validated fractions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a fraction is negative or not
    /// finite, or if the sum differs from 1.0 by [`FRACTION_TOLERANCE`] or
    /// more.
    pub fn new(train: f64, valid: f64, test: f64) -> Result<Self> {
        for (name, value) in [("train", train), ("valid", valid), ("test", test)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_argument(format!(
                    "{name} fraction must be a finite non-negative number, got {value}"
                )));
            }
        }

        let total = train + valid + test;
        if (total - 1.0).abs() >= FRACTION_TOLERANCE {
            return Err(Error::invalid_argument(format!(
                "split fractions must sum to 1.0, got {total}"
            )));
        }

        Ok(Self { train, valid, test })
    }

    /// Creates a two-way split with no test fraction.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::new`].
    pub fn train_valid(train: f64, valid: f64) -> Result<Self> {
        Self::new(train, valid, 0.0)
    }

    /// Training fraction.
    pub fn train(&self) -> f64 {
        self.train
    }

    /// Validation fraction.
    pub fn valid(&self) -> f64 {
        self.valid
    }

    /// Test fraction.
    pub fn test(&self) -> f64 {
        self.test
    }

    /// Exact validation size for `n` rows: `floor(n * valid)`.
    pub fn valid_count(&self, n: usize) -> usize {
        ((n as f64) * self.valid).floor() as usize
    }

    /// Exact test size for `n` rows: `floor(n * test)`.
    pub fn test_count(&self, n: usize) -> usize {
        ((n as f64) * self.test).floor() as usize
    }
}

/// Index lists of a split, each in random order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    /// Training rows.
    pub train: Vec<usize>,
    /// Validation rows.
    pub valid: Vec<usize>,
    /// Test rows.
    pub test: Vec<usize>,
}

impl SplitIndices {
    /// Total number of indices over the three sets.
    pub fn len(&self) -> usize {
        self.train.len() + self.valid.len() + self.test.len()
    }

    /// Returns true if all three sets are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the exactness guarantees of a split over `n` rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalInconsistency`] if the validation or test
    /// size is off, or the sets overlap or leave a row uncovered.
    pub fn verify(&self, n: usize, n_valid: usize, n_test: usize) -> Result<()> {
        if self.valid.len() != n_valid {
            return Err(Error::internal(format!(
                "validation set has {} rows, expected {n_valid}",
                self.valid.len()
            )));
        }
        if self.test.len() != n_test {
            return Err(Error::internal(format!(
                "test set has {} rows, expected {n_test}",
                self.test.len()
            )));
        }
        if self.len() != n {
            return Err(Error::internal(format!(
                "split covers {} rows, dataset has {n}",
                self.len()
            )));
        }

        let mut seen = vec![false; n];
        for &row in self.train.iter().chain(&self.valid).chain(&self.test) {
            match seen.get_mut(row) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(Error::internal(format!("row {row} assigned twice")));
                }
                None => {
                    return Err(Error::internal(format!(
                        "row {row} out of range for {n} rows"
                    )));
                }
            }
        }
        // n distinct in-range rows cover 0..n
        Ok(())
    }

    /// Takes the rows of each set out of `dataset`.
    ///
    /// # Errors
    ///
    /// Returns an error if an index is out of bounds for `dataset`.
    pub fn materialize(&self, dataset: &ArrowDataset) -> Result<DatasetSplit> {
        Ok(DatasetSplit {
            train: dataset.take(&self.train)?,
            valid: dataset.take(&self.valid)?,
            test: dataset.take(&self.test)?,
        })
    }
}

/// Materialized split; every subset keeps the source schema.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    /// Training dataset
    pub train: ArrowDataset,
    /// Validation dataset
    pub valid: ArrowDataset,
    /// Test dataset (zero rows for a two-way split)
    pub test: ArrowDataset,
}

impl DatasetSplit {
    /// Get training data
    pub fn train(&self) -> &ArrowDataset {
        &self.train
    }

    /// Get validation data
    pub fn valid(&self) -> &ArrowDataset {
        &self.valid
    }

    /// Get test data
    pub fn test(&self) -> &ArrowDataset {
        &self.test
    }
}

/// A strategy for partitioning a dataset into train/validation/test rows.
pub trait Splitter {
    /// Splits `dataset` according to `fractions`.
    ///
    /// `labels`, when given, replaces the dataset's label column and must
    /// have one entry per row.
    ///
    /// # Errors
    ///
    /// Implementations return [`Error::InvalidArgument`] for unusable
    /// labels and [`Error::InternalInconsistency`] if their result breaks
    /// the size or coverage guarantees.
    fn split(
        &self,
        dataset: &ArrowDataset,
        fractions: SplitFractions,
        labels: Option<&dyn Array>,
    ) -> Result<SplitIndices>;

    /// Three-way split returning row indices.
    ///
    /// # Errors
    ///
    /// See [`Splitter::split`].
    fn train_valid_test_split(
        &self,
        dataset: &ArrowDataset,
        fractions: SplitFractions,
        labels: Option<&dyn Array>,
    ) -> Result<SplitIndices> {
        self.split(dataset, fractions, labels)
    }

    /// Three-way split returning the subsets themselves.
    ///
    /// # Errors
    ///
    /// See [`Splitter::split`].
    fn train_valid_test_datasets(
        &self,
        dataset: &ArrowDataset,
        fractions: SplitFractions,
        labels: Option<&dyn Array>,
    ) -> Result<DatasetSplit> {
        self.split(dataset, fractions, labels)?.materialize(dataset)
    }

    /// Two-way split returning `(train, valid)` row indices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `frac_train + frac_valid` is
    /// not 1.0, otherwise see [`Splitter::split`].
    fn train_valid_split(
        &self,
        dataset: &ArrowDataset,
        frac_train: f64,
        frac_valid: f64,
        labels: Option<&dyn Array>,
    ) -> Result<(Vec<usize>, Vec<usize>)> {
        let fractions = SplitFractions::train_valid(frac_train, frac_valid)?;
        let split = self.split(dataset, fractions, labels)?;
        if !split.test.is_empty() {
            return Err(Error::internal(format!(
                "two-way split produced {} test rows",
                split.test.len()
            )));
        }
        Ok((split.train, split.valid))
    }

    /// Two-way split returning the `(train, valid)` subsets.
    ///
    /// # Errors
    ///
    /// See [`Splitter::train_valid_split`].
    fn train_valid_datasets(
        &self,
        dataset: &ArrowDataset,
        frac_train: f64,
        frac_valid: f64,
        labels: Option<&dyn Array>,
    ) -> Result<(ArrowDataset, ArrowDataset)> {
        let (train, valid) = self.train_valid_split(dataset, frac_train, frac_valid, labels)?;
        Ok((dataset.take(&train)?, dataset.take(&valid)?))
    }
}

/// Options of a [`StratifiedSplitter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StratifiedOptions {
    /// Column holding the labels when none are passed explicitly.
    pub label_column: LabelColumn,
    /// Task to stratify on when labels are multi-task.
    pub task_index: usize,
    /// Classification, regression, or inferred from the label type.
    pub task_type: TaskType,
    /// Number of quantile bins for regression labels.
    pub n_bin: usize,
    /// Random seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for StratifiedOptions {
    fn default() -> Self {
        Self {
            label_column: LabelColumn::Last,
            task_index: 0,
            task_type: TaskType::Infer,
            n_bin: 10,
            seed: None,
        }
    }
}

/// Splitter that keeps per-class proportions in every subset.
///
/// Validation and test sizes are exact at the dataset level
/// (`floor(n * fraction)`); their per-class shares come from
/// largest-remainder apportionment, validation first, then test over what
/// is left of each class. Within a class the rows are picked by a seeded
/// random permutation, and each of the three lists is shuffled at the end.
///
/// # Example
///
/// ```
/// use molsplit::split::{SplitFractions, StratifiedSplitter};
/// use molsplit::labels::LabelValues;
///
/// let labels = LabelValues::Integer(vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
/// let split = StratifiedSplitter::new()
///     .seed(7)
///     .split_labels(&labels, SplitFractions::default())
///     .unwrap();
/// assert_eq!((split.train.len(), split.valid.len(), split.test.len()), (8, 1, 1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StratifiedSplitter {
    options: StratifiedOptions,
}

impl StratifiedSplitter {
    /// Creates a splitter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a splitter from a full set of options.
    pub fn with_options(options: StratifiedOptions) -> Self {
        Self { options }
    }

    /// Returns the current options.
    pub fn options(&self) -> &StratifiedOptions {
        &self.options
    }

    /// Sets the label column.
    #[must_use]
    pub fn label_column(mut self, column: LabelColumn) -> Self {
        self.options.label_column = column;
        self
    }

    /// Sets the task index for multi-task labels.
    #[must_use]
    pub fn task_index(mut self, task_index: usize) -> Self {
        self.options.task_index = task_index;
        self
    }

    /// Sets the task type.
    #[must_use]
    pub fn task_type(mut self, task_type: TaskType) -> Self {
        self.options.task_type = task_type;
        self
    }

    /// Sets the number of regression bins.
    #[must_use]
    pub fn n_bin(mut self, n_bin: usize) -> Self {
        self.options.n_bin = n_bin;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    /// Reads the labels to stratify on.
    ///
    /// # Errors
    ///
    /// Returns an error if the label column cannot be found or read, or if
    /// the label count differs from the dataset length.
    pub fn resolve_labels(
        &self,
        dataset: &ArrowDataset,
        labels: Option<&dyn Array>,
    ) -> Result<LabelValues> {
        let values = match labels {
            Some(array) => LabelValues::from_array(array, self.options.task_index)?,
            None => {
                let column = dataset.column(&self.options.label_column)?;
                LabelValues::from_array(column.as_ref(), self.options.task_index)?
            }
        };

        if values.len() != dataset.len() {
            return Err(Error::invalid_argument(format!(
                "got {} labels for a dataset of {} rows",
                values.len(),
                dataset.len()
            )));
        }
        Ok(values)
    }

    /// Splits rows given their labels directly; row `i` has label `i`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDataset`] for no labels,
    /// [`Error::InvalidArgument`] if the labels cannot be discretized or the
    /// validation and test sizes together exceed the row count, and
    /// [`Error::InternalInconsistency`] if the result fails verification.
    pub fn split_labels(
        &self,
        labels: &LabelValues,
        fractions: SplitFractions,
    ) -> Result<SplitIndices> {
        let n = labels.len();
        if n == 0 {
            return Err(Error::EmptyDataset);
        }

        // a sum just above 1.0 is within tolerance but can still overshoot n
        let n_valid = fractions.valid_count(n);
        let n_test = fractions.test_count(n);
        if n_valid + n_test > n {
            return Err(Error::invalid_argument(format!(
                "valid fraction {} and test fraction {} select {} rows out of {n}",
                fractions.valid(),
                fractions.test(),
                n_valid + n_test
            )));
        }

        let classes = labels.discretize(self.options.task_type, self.options.n_bin)?;
        let class_counts = classes.counts();

        let valid_counts = apportion(&class_counts, n_valid)?;
        let remaining: Vec<usize> = class_counts
            .iter()
            .zip(&valid_counts)
            .map(|(count, valid)| count - valid)
            .collect();
        let test_counts = apportion(&remaining, n_test)?;

        log::debug!(
            "stratified split of {n} rows over {} classes: train={}, valid={n_valid}, test={n_test}",
            classes.n_classes(),
            n - n_valid - n_test
        );
        for (class, count) in class_counts.iter().enumerate() {
            if *count == 0 {
                log::warn!("class {} is empty", classes.names()[class]);
            }
        }

        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut split = SplitIndices {
            train: Vec::with_capacity(n - n_valid - n_test),
            valid: Vec::with_capacity(n_valid),
            test: Vec::with_capacity(n_test),
        };

        for ((mut members, class_valid), class_test) in classes
            .groups()
            .into_iter()
            .zip(valid_counts)
            .zip(test_counts)
        {
            members.shuffle(&mut rng);
            let (valid, rest) = members.split_at(class_valid);
            let (test, train) = rest.split_at(class_test);
            split.valid.extend_from_slice(valid);
            split.test.extend_from_slice(test);
            split.train.extend_from_slice(train);
        }

        split.train.shuffle(&mut rng);
        split.valid.shuffle(&mut rng);
        split.test.shuffle(&mut rng);

        split.verify(n, n_valid, n_test)?;
        Ok(split)
    }
}

impl Splitter for StratifiedSplitter {
    fn split(
        &self,
        dataset: &ArrowDataset,
        fractions: SplitFractions,
        labels: Option<&dyn Array>,
    ) -> Result<SplitIndices> {
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let values = self.resolve_labels(dataset, labels)?;
        self.split_labels(&values, fractions)
    }
}

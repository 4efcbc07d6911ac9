//! molsplit - Stratified Dataset Splitting in Pure Rust
//!
//! Splits labeled datasets into train/validation/test subsets that keep the
//! label distribution of the whole dataset, for classification labels and
//! (quantile-binned) regression labels alike.
//!
//! # Design Principles
//!
//! 1. **Exact sizes** - validation and test get exactly
//!    `floor(n * fraction)` rows, apportioned across classes by largest
//!    remainder
//! 2. **Reproducible** - a seed fixes every row assignment
//! 3. **Zero-copy** - Arrow `RecordBatch` throughout
//! 4. **Ecosystem aligned** - Arrow 53, Parquet 53
//!
//! # Quick Start
//!
//! ```no_run
//! use molsplit::{ArrowDataset, SplitFractions, Splitter, StratifiedSplitter};
//!
//! let dataset = ArrowDataset::from_parquet("data/qm9.parquet").unwrap();
//!
//! let splitter = StratifiedSplitter::new().seed(42);
//! let split = splitter
//!     .train_valid_test_datasets(&dataset, SplitFractions::default(), None)
//!     .unwrap();
//!
//! split.train().to_parquet("data/train.parquet").unwrap();
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::redundant_clone,
        clippy::too_many_lines,
        clippy::float_cmp,
        clippy::similar_names,
        clippy::unreadable_literal
    )
)]
// Allow some pedantic lints for cleaner code
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::map_unwrap_or)]

pub mod apportion;
/// CLI module for command-line interface
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod labels;
pub mod split;

// Re-exports for convenience
// Re-export arrow types commonly needed
pub use arrow::{
    array::RecordBatch,
    datatypes::{Schema, SchemaRef},
};
pub use apportion::apportion;
pub use config::SplitConfig;
pub use dataset::{ArrowDataset, Dataset};
pub use error::{Error, Result};
pub use labels::{Classes, LabelColumn, LabelValues, TaskType};
pub use split::{
    DatasetSplit, SplitFractions, SplitIndices, Splitter, StratifiedOptions, StratifiedSplitter,
};

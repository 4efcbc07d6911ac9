//! The `split` command.

use std::path::{Path, PathBuf};

use crate::{
    config::SplitConfig,
    labels::{LabelColumn, TaskType},
    split::{SplitFractions, Splitter},
    Dataset,
};

use super::basic::{extension, load_dataset, save_dataset};

/// Command-line overrides applied on top of a [`SplitConfig`].
#[derive(Debug, Default)]
pub(crate) struct SplitArgs {
    pub label_column: Option<LabelColumn>,
    pub task_index: Option<usize>,
    pub task_type: Option<TaskType>,
    pub n_bin: Option<usize>,
    pub frac_train: Option<f64>,
    pub frac_valid: Option<f64>,
    pub frac_test: Option<f64>,
    pub seed: Option<u64>,
}

impl SplitArgs {
    /// Merges the flags into `config`; flags win.
    pub(crate) fn apply(self, mut config: SplitConfig) -> crate::Result<SplitConfig> {
        if let Some(column) = self.label_column {
            config.options.label_column = column;
        }
        if let Some(task_index) = self.task_index {
            config.options.task_index = task_index;
        }
        if let Some(task_type) = self.task_type {
            config.options.task_type = task_type;
        }
        if let Some(n_bin) = self.n_bin {
            config.options.n_bin = n_bin;
        }
        if self.seed.is_some() {
            config.options.seed = self.seed;
        }
        if self.frac_train.is_some() || self.frac_valid.is_some() || self.frac_test.is_some() {
            let current = config.fractions;
            config.fractions = SplitFractions::new(
                self.frac_train.unwrap_or(current.train()),
                self.frac_valid.unwrap_or(current.valid()),
                self.frac_test.unwrap_or(current.test()),
            )?;
        }
        Ok(config)
    }
}

/// Split a dataset file into train/valid/test.
///
/// Writes `train`, `valid` and `test` files with the input's extension into
/// `output_dir`, or prints the index lists as JSON when `indices` is set.
pub(crate) fn cmd_split(
    input: &Path,
    config_path: Option<&PathBuf>,
    args: SplitArgs,
    output_dir: Option<&PathBuf>,
    indices: bool,
) -> crate::Result<()> {
    let config = match config_path {
        Some(path) => SplitConfig::from_json_file(path)?,
        None => SplitConfig::default(),
    };
    let config = args.apply(config)?;

    let dataset = load_dataset(input)?;
    let splitter = config.splitter();
    let split = splitter.train_valid_test_split(&dataset, config.fractions, None)?;

    if indices {
        println!("{}", serde_json::to_string_pretty(&split)?);
        return Ok(());
    }

    let output_dir = output_dir.ok_or_else(|| {
        crate::Error::invalid_argument("either --output-dir or --indices is required")
    })?;
    std::fs::create_dir_all(output_dir).map_err(|e| crate::Error::io(e, output_dir))?;

    let subsets = split.materialize(&dataset)?;
    let ext = extension(input);
    for (name, subset) in [
        ("train", subsets.train()),
        ("valid", subsets.valid()),
        ("test", subsets.test()),
    ] {
        let path = output_dir.join(format!("{name}.{ext}"));
        save_dataset(subset, &path)?;
        log::debug!("wrote {} rows to {}", subset.len(), path.display());
    }

    println!(
        "Split {} ({} rows): {} train, {} valid, {} test -> {}",
        input.display(),
        dataset.len(),
        split.train.len(),
        split.valid.len(),
        split.test.len(),
        output_dir.display()
    );

    Ok(())
}

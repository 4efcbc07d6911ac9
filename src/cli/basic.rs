//! Dataset loading and inspection commands.

use std::path::Path;

use crate::{
    labels::{LabelColumn, LabelValues, TaskType},
    ArrowDataset, Dataset,
};

/// File extension of a path, or an empty string.
pub(crate) fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// Load a dataset from a file path based on extension.
pub(crate) fn load_dataset(path: &Path) -> crate::Result<ArrowDataset> {
    match extension(path) {
        "parquet" => ArrowDataset::from_parquet(path),
        "csv" => ArrowDataset::from_csv(path),
        ext => Err(crate::Error::unsupported_format(ext)),
    }
}

/// Save a dataset to a file path based on extension.
pub(crate) fn save_dataset(dataset: &ArrowDataset, path: &Path) -> crate::Result<()> {
    match extension(path) {
        "parquet" => dataset.to_parquet(path),
        "csv" => dataset.to_csv(path),
        ext => Err(crate::Error::unsupported_format(ext)),
    }
}

/// Get format name from file extension.
pub(crate) fn get_format(path: &Path) -> &'static str {
    match extension(path) {
        "parquet" => "Parquet",
        "csv" => "CSV",
        _ => "Unknown",
    }
}

/// Picks the label column from the `--label-column`/`--label-index` flags.
pub(crate) fn label_column(name: Option<String>, index: Option<usize>) -> Option<LabelColumn> {
    match (name, index) {
        (Some(name), _) => Some(LabelColumn::Name(name)),
        (None, Some(index)) => Some(LabelColumn::Index(index)),
        (None, None) => None,
    }
}

/// Display dataset information and the label class distribution.
pub(crate) fn cmd_info(
    path: &Path,
    label: &LabelColumn,
    task_index: usize,
    task_type: TaskType,
    n_bin: usize,
) -> crate::Result<()> {
    let dataset = load_dataset(path)?;

    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    println!("File: {}", path.display());
    println!("Format: {}", get_format(path));
    println!("Rows: {}", dataset.len());
    println!("Columns: {}", dataset.schema().fields().len());
    println!("Size: {} bytes", file_size);

    let classes = dataset
        .column(label)
        .and_then(|column| LabelValues::from_array(column.as_ref(), task_index))
        .and_then(|values| {
            let task_type = values.infer_task_type(task_type);
            values.discretize(task_type, n_bin).map(|c| (task_type, c))
        });

    match classes {
        Ok((task_type, classes)) => {
            println!();
            println!("Task: {}", task_type);
            println!("Classes: {}", classes.n_classes());
            let total = dataset.len().max(1);
            for (name, count) in classes.names().iter().zip(classes.counts()) {
                #[allow(clippy::cast_precision_loss)]
                let share = count as f64 * 100.0 / total as f64;
                println!("  {name}: {count} ({share:.1}%)");
            }
        }
        Err(e) => {
            log::warn!("no class distribution for {}: {e}", path.display());
            println!("Classes: unavailable ({e})");
        }
    }

    Ok(())
}

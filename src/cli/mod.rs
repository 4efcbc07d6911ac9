//! molsplit CLI - stratified dataset splitting
//!
//! Command-line interface for molsplit operations.

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

use crate::labels::{LabelColumn, TaskType};

mod basic;
mod split;

/// molsplit - Stratified train/validation/test splitting for molecular datasets
#[derive(Parser)]
#[command(name = "molsplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a dataset into train/valid/test with per-class proportions
    Split {
        /// Input dataset file (Parquet/CSV)
        input: PathBuf,
        /// Label column name (default: last column)
        #[arg(long, conflicts_with = "label_index")]
        label_column: Option<String>,
        /// Label column position
        #[arg(long)]
        label_index: Option<usize>,
        /// Task to stratify on for multi-task labels
        #[arg(long)]
        task_index: Option<usize>,
        /// Task type (infer, classification, regression)
        #[arg(long)]
        task_type: Option<TaskType>,
        /// Number of quantile bins for regression labels
        #[arg(long)]
        n_bin: Option<usize>,
        /// Training set fraction
        #[arg(long)]
        frac_train: Option<f64>,
        /// Validation set fraction
        #[arg(long)]
        frac_valid: Option<f64>,
        /// Test set fraction
        #[arg(long)]
        frac_test: Option<f64>,
        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,
        /// JSON config file with fractions and split options
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory receiving train/valid/test files
        #[arg(short, long, conflicts_with = "indices")]
        output_dir: Option<PathBuf>,
        /// Print the index lists as JSON instead of writing files
        #[arg(long)]
        indices: bool,
    },
    /// Display dataset information and label distribution
    Info {
        /// Path to dataset file
        path: PathBuf,
        /// Label column name (default: last column)
        #[arg(long, conflicts_with = "label_index")]
        label_column: Option<String>,
        /// Label column position
        #[arg(long)]
        label_index: Option<usize>,
        /// Task to inspect for multi-task labels
        #[arg(long, default_value = "0")]
        task_index: usize,
        /// Task type (infer, classification, regression)
        #[arg(long, default_value = "infer")]
        task_type: TaskType,
        /// Number of quantile bins for regression labels
        #[arg(long, default_value = "10")]
        n_bin: usize,
    },
}

/// Run the molsplit CLI.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Split {
            input,
            label_column,
            label_index,
            task_index,
            task_type,
            n_bin,
            frac_train,
            frac_valid,
            frac_test,
            seed,
            config,
            output_dir,
            indices,
        } => {
            let args = split::SplitArgs {
                label_column: basic::label_column(label_column, label_index),
                task_index,
                task_type,
                n_bin,
                frac_train,
                frac_valid,
                frac_test,
                seed,
            };
            split::cmd_split(&input, config.as_ref(), args, output_dir.as_ref(), indices)
        }
        Commands::Info {
            path,
            label_column,
            label_index,
            task_index,
            task_type,
            n_bin,
        } => {
            let label = basic::label_column(label_column, label_index).unwrap_or(LabelColumn::Last);
            basic::cmd_info(&path, &label, task_index, task_type, n_bin)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

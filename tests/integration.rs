//! Integration tests for molsplit.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::uninlined_format_args,
    clippy::cast_lossless
)]

use std::{collections::HashSet, sync::Arc};

use arrow::{
    array::{Array, AsArray, FixedSizeListArray, Float64Array, Int32Array, RecordBatch},
    datatypes::{DataType, Field, Float64Type, Int32Type, Schema},
};
use molsplit::{
    graph::{BondType, Molecule, RelGcnSparsePreprocessor},
    ArrowDataset, Dataset, LabelColumn, LabelValues, SplitConfig, SplitFractions, SplitIndices,
    Splitter, StratifiedSplitter, TaskType,
};

/// Creates a dataset with an `id` column and an Int32 `label` column.
fn create_labeled_dataset(labels: &[i32]) -> ArrowDataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("label", DataType::Int32, false),
    ]));
    let ids: Vec<i32> = (0..labels.len() as i32).collect();

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int32Array::from(ids)),
            Arc::new(Int32Array::from(labels.to_vec())),
        ],
    )
    .ok()
    .unwrap_or_else(|| panic!("Should create batch"));

    ArrowDataset::from_batch(batch)
        .ok()
        .unwrap_or_else(|| panic!("Should create dataset"))
}

/// Creates a dataset whose last column is the float target `0, 1, ..., n-1`.
fn create_regression_dataset(rows: usize) -> ArrowDataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("target", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int32Array::from((0..rows as i32).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(
                (0..rows).map(|i| i as f64).collect::<Vec<_>>(),
            )),
        ],
    )
    .ok()
    .unwrap_or_else(|| panic!("Should create batch"));

    ArrowDataset::from_batch(batch)
        .ok()
        .unwrap_or_else(|| panic!("Should create dataset"))
}

/// Per-class counts of `rows`, where class ids index `labels`.
fn class_counts(labels: &[i32], rows: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &row in rows {
        counts[labels[row] as usize] += 1;
    }
    counts
}

fn assert_partition(split: &SplitIndices, n: usize) {
    let all: HashSet<usize> = split
        .train
        .iter()
        .chain(&split.valid)
        .chain(&split.test)
        .copied()
        .collect();
    assert_eq!(all.len(), n, "subsets must be disjoint");
    assert_eq!(split.len(), n);
    assert!(all.iter().all(|&i| i < n));
}

#[test]
fn test_balanced_two_class_split() {
    let labels = [0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
    let dataset = create_labeled_dataset(&labels);

    let split = StratifiedSplitter::new()
        .seed(0)
        .train_valid_test_split(&dataset, SplitFractions::default(), None)
        .unwrap();

    assert_partition(&split, 10);
    // Ties in the remainder go to the lower class id.
    assert_eq!(class_counts(&labels, &split.valid, 2), vec![1, 0]);
    assert_eq!(class_counts(&labels, &split.test, 2), vec![0, 1]);
    assert_eq!(class_counts(&labels, &split.train, 2), vec![4, 4]);
}

#[test]
fn test_three_class_distribution_preserved() {
    let labels: Vec<i32> = (0..100)
        .map(|i| match i {
            0..=59 => 0,
            60..=89 => 1,
            _ => 2,
        })
        .collect();
    let dataset = create_labeled_dataset(&labels);
    let fractions = SplitFractions::new(0.7, 0.2, 0.1).unwrap();

    let split = StratifiedSplitter::new()
        .seed(42)
        .train_valid_test_split(&dataset, fractions, None)
        .unwrap();

    assert_partition(&split, 100);
    assert_eq!(class_counts(&labels, &split.valid, 3), vec![12, 6, 2]);
    assert_eq!(class_counts(&labels, &split.test, 3), vec![6, 3, 1]);
    assert_eq!(class_counts(&labels, &split.train, 3), vec![42, 21, 7]);
}

#[test]
fn test_regression_split_uses_quantile_bins() {
    let dataset = create_regression_dataset(100);

    let split = StratifiedSplitter::new()
        .n_bin(4)
        .seed(11)
        .train_valid_test_split(&dataset, SplitFractions::default(), None)
        .unwrap();

    assert_partition(&split, 100);
    // Rows 0..25, 25..50, 50..75 and 75..100 form the four bins.
    let bins: Vec<i32> = (0..100).map(|i| i / 25).collect();
    assert_eq!(class_counts(&bins, &split.valid, 4), vec![3, 3, 2, 2]);
    assert_eq!(class_counts(&bins, &split.test, 4), vec![2, 2, 3, 3]);
    assert_eq!(class_counts(&bins, &split.train, 4), vec![20, 20, 20, 20]);
}

#[test]
fn test_same_seed_same_split_across_calls() {
    let dataset = create_regression_dataset(57);
    let splitter = StratifiedSplitter::new().n_bin(3).seed(99);

    let first = splitter
        .train_valid_test_split(&dataset, SplitFractions::default(), None)
        .unwrap();
    let second = splitter
        .train_valid_test_split(&dataset, SplitFractions::default(), None)
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_materialized_subsets_follow_indices() {
    let labels: Vec<i32> = (0..40).map(|i| i % 4).collect();
    let dataset = create_labeled_dataset(&labels);
    let splitter = StratifiedSplitter::new().seed(5);

    let indices = splitter
        .train_valid_test_split(&dataset, SplitFractions::default(), None)
        .unwrap();
    let subsets = splitter
        .train_valid_test_datasets(&dataset, SplitFractions::default(), None)
        .unwrap();

    assert_eq!(subsets.train().len(), 32);
    assert_eq!(subsets.valid().len(), 4);
    assert_eq!(subsets.test().len(), 4);

    // Row i of the validation subset is dataset row indices.valid[i].
    let batch = subsets.valid().to_single_batch().unwrap();
    let ids: Vec<usize> = batch
        .column(0)
        .as_primitive::<Int32Type>()
        .values()
        .iter()
        .map(|&id| id as usize)
        .collect();
    assert_eq!(ids, indices.valid);
}

#[test]
fn test_explicit_labels_array() {
    let dataset = create_regression_dataset(20);
    // Stratify on a parity label instead of the float target.
    let parity = Int32Array::from((0..20).map(|i| i % 2).collect::<Vec<_>>());
    let labels: Vec<i32> = parity.values().to_vec();

    let split = StratifiedSplitter::new()
        .seed(3)
        .train_valid_test_split(&dataset, SplitFractions::default(), Some(&parity))
        .unwrap();

    assert_eq!(class_counts(&labels, &split.valid, 2), vec![1, 1]);
    assert_eq!(class_counts(&labels, &split.test, 2), vec![1, 1]);
}

#[test]
fn test_multi_task_label_column() {
    let rows = 30;
    let mut values = Vec::with_capacity(rows * 2);
    for i in 0..rows {
        values.push(i as f64);
        values.push(f64::from(i as i32 % 3));
    }
    let item = Arc::new(Field::new("item", DataType::Float64, false));
    let tasks = FixedSizeListArray::new(item.clone(), 2, Arc::new(Float64Array::from(values)), None);
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("tasks", DataType::FixedSizeList(item, 2), false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int32Array::from((0..rows as i32).collect::<Vec<_>>())),
            Arc::new(tasks),
        ],
    )
    .unwrap();
    let dataset = ArrowDataset::from_batch(batch).unwrap();

    let split = StratifiedSplitter::new()
        .label_column(LabelColumn::Name("tasks".to_string()))
        .task_index(1)
        .task_type(TaskType::Classification)
        .seed(8)
        .train_valid_test_split(&dataset, SplitFractions::default(), None)
        .unwrap();

    let classes: Vec<i32> = (0..rows as i32).map(|i| i % 3).collect();
    assert_eq!(class_counts(&classes, &split.valid, 3), vec![1, 1, 1]);
    assert_eq!(class_counts(&classes, &split.test, 3), vec![1, 1, 1]);
    assert_eq!(class_counts(&classes, &split.train, 3), vec![8, 8, 8]);
}

#[test]
fn test_two_way_split() {
    let labels: Vec<i32> = (0..50).map(|i| i32::from(i >= 40)).collect();
    let dataset = create_labeled_dataset(&labels);

    let (train, valid) = StratifiedSplitter::new()
        .seed(1)
        .train_valid_split(&dataset, 0.8, 0.2, None)
        .unwrap();

    assert_eq!(train.len(), 40);
    assert_eq!(valid.len(), 10);
    assert_eq!(class_counts(&labels, &valid, 2), vec![8, 2]);
}

#[test]
fn test_parquet_split_roundtrip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let labels: Vec<i32> = (0..60).map(|i| i % 3).collect();
    let source = temp_dir.path().join("data.parquet");
    create_labeled_dataset(&labels).to_parquet(&source).unwrap();

    let dataset = ArrowDataset::from_parquet(&source).unwrap();
    let split = StratifiedSplitter::new()
        .seed(21)
        .train_valid_test_datasets(&dataset, SplitFractions::default(), None)
        .unwrap();

    let train_path = temp_dir.path().join("train.parquet");
    split.train().to_parquet(&train_path).unwrap();
    let train = ArrowDataset::from_parquet(&train_path).unwrap();
    assert_eq!(train.len(), 48);

    let label_column = train.column(&LabelColumn::Last).unwrap();
    let train_labels = LabelValues::from_array(label_column.as_ref(), 0).unwrap();
    let classes = train_labels.discretize(TaskType::Infer, 10).unwrap();
    assert_eq!(classes.counts(), vec![16, 16, 16]);
}

#[test]
fn test_config_driven_split() {
    let config = SplitConfig::from_json_str(
        r#"{
            "frac_train": 0.6,
            "frac_valid": 0.2,
            "frac_test": 0.2,
            "label_column": {"name": "target"},
            "task_type": "regression",
            "n_bin": 5,
            "seed": 4
        }"#,
    )
    .unwrap();
    let dataset = create_regression_dataset(50);

    let split = config
        .splitter()
        .train_valid_test_split(&dataset, config.fractions, None)
        .unwrap();

    assert_partition(&split, 50);
    assert_eq!(split.valid.len(), 10);
    assert_eq!(split.test.len(), 10);
    let bins: Vec<i32> = (0..50).map(|i| i / 10).collect();
    assert_eq!(class_counts(&bins, &split.valid, 5), vec![2; 5]);
}

#[test]
fn test_split_graph_dataset_by_labels() {
    let preprocessor = RelGcnSparsePreprocessor::new(Some(8), None).unwrap();
    let mut xs = Vec::new();
    let mut adjs = Vec::new();
    let mut ys = Vec::new();
    for i in 0..20 {
        // carbon chains of growing length
        let len = 2 + i % 5;
        let mut mol = Molecule::new(vec![6; len]);
        for a in 1..len {
            mol = mol.with_bond(a - 1, a, BondType::Single);
        }
        let (x, adj) = preprocessor.dense().input_features(&mol).unwrap();
        xs.push(x);
        adjs.push(adj);
        ys.push(vec![len as f64]);
    }
    let graphs = preprocessor.create_dataset(xs, &adjs, Some(ys)).unwrap();

    let targets = LabelValues::Integer(
        graphs
            .iter()
            .map(|g| g.num_nodes() as i64)
            .collect(),
    );
    let split = StratifiedSplitter::new()
        .seed(2)
        .split_labels(&targets, SplitFractions::default())
        .unwrap();

    let valid = graphs.select(&split.valid).unwrap();
    assert_eq!(valid.len(), 2);
    let test = graphs.select(&split.test).unwrap();
    assert_eq!(test.len(), 2);
    // each chain of n atoms has n - 1 bonds, two directed edges each
    for graph in valid.iter().chain(test.iter()) {
        assert_eq!(graph.num_edges(), 2 * (graph.num_nodes() - 1));
    }
}

#[test]
fn test_float_column_without_type_hint_is_regression() {
    let dataset = create_regression_dataset(10);
    let column = dataset.column(&LabelColumn::Last).unwrap();
    assert_eq!(column.data_type(), &DataType::Float64);
    let values = LabelValues::from_array(column.as_ref(), 0).unwrap();
    assert_eq!(values.infer_task_type(TaskType::Infer), TaskType::Regression);
    assert_eq!(
        column.as_primitive::<Float64Type>().value(9),
        9.0,
        "last column is the target"
    );
}

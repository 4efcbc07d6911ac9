//! Dataset types for molsplit.
//!
//! Provides the [`Dataset`] trait and the [`ArrowDataset`] implementation,
//! the tabular container that splits are computed over and materialized
//! from.

use std::{path::Path, sync::Arc};

use arrow::{
    array::{ArrayRef, RecordBatch, UInt64Array},
    compute::{concat_batches, take},
    datatypes::SchemaRef,
};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    file::properties::WriterProperties,
};

use crate::{
    error::{Error, Result},
    labels::LabelColumn,
};

/// A dataset that can be iterated over.
///
/// Datasets provide access to tabular data stored as Arrow RecordBatches.
/// All implementations must be thread-safe (Send + Sync).
pub trait Dataset: Send + Sync {
    /// Returns the total number of rows in the dataset.
    fn len(&self) -> usize;

    /// Returns true if the dataset contains no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the schema of the dataset.
    fn schema(&self) -> SchemaRef;

    /// Returns an iterator over all RecordBatches in the dataset.
    fn iter(&self) -> Box<dyn Iterator<Item = RecordBatch> + Send + '_>;

    /// Returns the number of batches in the dataset.
    fn num_batches(&self) -> usize;

    /// Returns a specific batch by index.
    fn get_batch(&self, index: usize) -> Option<&RecordBatch>;
}

/// An in-memory dataset backed by Arrow RecordBatches.
///
/// Rows are addressed by their global position across batches, which is
/// the index space that [`crate::split::SplitIndices`] refers to.
#[derive(Debug, Clone)]
pub struct ArrowDataset {
    batches: Vec<RecordBatch>,
    schema: SchemaRef,
    row_count: usize,
}

impl ArrowDataset {
    /// Creates a new ArrowDataset from a vector of RecordBatches.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The batches vector is empty
    /// - The batches have inconsistent schemas
    pub fn new(batches: Vec<RecordBatch>) -> Result<Self> {
        let Some(first) = batches.first() else {
            return Err(Error::EmptyDataset);
        };
        let schema = first.schema();

        for (i, batch) in batches.iter().enumerate().skip(1) {
            if batch.schema() != schema {
                return Err(Error::schema_mismatch(format!(
                    "Batch {i} has different schema than batch 0"
                )));
            }
        }

        let row_count = batches.iter().map(RecordBatch::num_rows).sum();

        Ok(Self {
            batches,
            schema,
            row_count,
        })
    }

    /// Creates an ArrowDataset from a single RecordBatch.
    ///
    /// A batch with zero rows is accepted; empty split subsets are
    /// represented this way.
    ///
    /// # Errors
    ///
    /// Never fails for a single batch; the signature matches [`Self::new`].
    pub fn from_batch(batch: RecordBatch) -> Result<Self> {
        Self::new(vec![batch])
    }

    /// Loads a dataset from a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid Parquet,
    /// or holds no batches.
    pub fn from_parquet(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let batches: Vec<RecordBatch> =
            reader.collect::<std::result::Result<Vec<_>, _>>()?;

        Self::new(batches)
    }

    /// Saves the dataset to a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    pub fn to_parquet(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::io(e, path))?;

        let props = WriterProperties::builder().build();
        let mut writer = ArrowWriter::try_new(file, self.schema.clone(), Some(props))?;
        for batch in &self.batches {
            writer.write(batch)?;
        }
        writer.close()?;
        Ok(())
    }

    /// Loads a dataset from a CSV file with a header row.
    ///
    /// Column types are inferred from the first 1000 records, so integer
    /// label columns come back as `Int64` and decimal ones as `Float64`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or is empty.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        use std::io::{BufReader, Seek, SeekFrom};

        use arrow_csv::{reader::Format, ReaderBuilder};

        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let mut buf_reader = BufReader::new(file);

        let (inferred, _) = Format::default()
            .with_header(true)
            .infer_schema(&mut buf_reader, Some(1000))?;
        buf_reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::io(e, path))?;

        let reader = ReaderBuilder::new(Arc::new(inferred))
            .with_header(true)
            .with_batch_size(8192)
            .build(buf_reader)?;
        let batches: Vec<RecordBatch> =
            reader.collect::<std::result::Result<Vec<_>, _>>()?;

        Self::new(batches)
    }

    /// Saves the dataset to a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        use arrow_csv::WriterBuilder;

        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::io(e, path))?;

        let mut writer = WriterBuilder::new().with_header(true).build(file);
        for batch in &self.batches {
            writer.write(batch)?;
        }
        Ok(())
    }

    /// Returns the underlying batches.
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Concatenates all batches into one.
    ///
    /// # Errors
    ///
    /// Returns an error if Arrow fails to concatenate the columns.
    pub fn to_single_batch(&self) -> Result<RecordBatch> {
        if let [batch] = self.batches.as_slice() {
            return Ok(batch.clone());
        }
        Ok(concat_batches(&self.schema, &self.batches)?)
    }

    /// Returns the full column selected by `column`, across all batches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the dataset has no columns or
    /// the index is out of range, and [`Error::ColumnNotFound`] for an
    /// unknown name.
    pub fn column(&self, column: &LabelColumn) -> Result<ArrayRef> {
        let num_columns = self.schema.fields().len();
        if num_columns == 0 {
            return Err(Error::invalid_argument(
                "dataset has no columns to extract labels from",
            ));
        }

        let index = match column {
            LabelColumn::Last => num_columns - 1,
            LabelColumn::Index(i) if *i < num_columns => *i,
            LabelColumn::Index(i) => {
                return Err(Error::invalid_argument(format!(
                    "label column index {i} out of range for {num_columns} columns"
                )))
            }
            LabelColumn::Name(name) => self
                .schema
                .index_of(name)
                .map_err(|_| Error::column_not_found(name.as_str()))?,
        };

        Ok(self.to_single_batch()?.column(index).clone())
    }

    /// Returns a new dataset holding the rows at `indices`, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any index is out of bounds.
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.row_count) {
            return Err(Error::invalid_argument(format!(
                "row index {bad} out of bounds for dataset with {} rows",
                self.row_count
            )));
        }

        let batch = self.to_single_batch()?;
        let indices_array = UInt64Array::from_iter_values(indices.iter().map(|&i| i as u64));
        let columns: Vec<ArrayRef> = batch
            .columns()
            .iter()
            .map(|col| take(col.as_ref(), &indices_array, None).map_err(Error::Arrow))
            .collect::<Result<Vec<_>>>()?;

        let taken = RecordBatch::try_new(batch.schema(), columns)?;
        Self::from_batch(taken)
    }
}

impl Dataset for ArrowDataset {
    fn len(&self) -> usize {
        self.row_count
    }

    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = RecordBatch> + Send + '_> {
        Box::new(self.batches.iter().cloned())
    }

    fn num_batches(&self) -> usize {
        self.batches.len()
    }

    fn get_batch(&self, index: usize) -> Option<&RecordBatch> {
        self.batches.get(index)
    }
}

//! Error types for molsplit.

use std::path::PathBuf;

/// Result type alias for molsplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in molsplit operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Arrow error during data processing.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error during file operations.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Column not found in schema.
    #[error("Column '{name}' not found in schema")]
    ColumnNotFound {
        /// The name of the missing column.
        name: String,
    },

    /// Invalid argument passed to a split or preprocessing operation.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of what was wrong with the argument.
        message: String,
    },

    /// A documented precondition of a numeric routine was not met.
    #[error("Precondition violated: {message}")]
    Precondition {
        /// Description of the violated precondition.
        message: String,
    },

    /// A split produced counts that break its exactness guarantees.
    ///
    /// This signals a defect, not a recoverable condition.
    #[error("Internal inconsistency: {message}")]
    InternalInconsistency {
        /// Description of the broken invariant.
        message: String,
    },

    /// Unsupported file format.
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        /// The unsupported format name or extension.
        format: String,
    },

    /// Empty dataset error.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Schema mismatch between batches.
    #[error("Schema mismatch: {message}")]
    SchemaMismatch {
        /// Description of the schema mismatch.
        message: String,
    },

    /// A molecule could not be featurized under the preprocessor limits.
    #[error("Feature extraction failed: {message}")]
    Feature {
        /// Description of the failure.
        message: String,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Create a column not found error.
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create an internal inconsistency error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalInconsistency {
            message: message.into(),
        }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Create a feature extraction error.
    pub fn feature(message: impl Into<String>) -> Self {
        Self::Feature {
            message: message.into(),
        }
    }

    /// Returns true if this error was caused by a bad argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io(io_err, "/path/to/labels.csv");
        assert!(err.to_string().contains("/path/to/labels.csv"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_column_not_found() {
        let err = Error::column_not_found("y");
        assert!(err.to_string().contains("'y'"));
    }

    #[test]
    fn test_invalid_argument() {
        let err = Error::invalid_argument("fractions must sum to 1.0");
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("fractions must sum to 1.0"));
    }

    #[test]
    fn test_precondition() {
        let err = Error::precondition("n_draws 11 exceeds population 10");
        assert!(!err.is_invalid_argument());
        assert!(err.to_string().starts_with("Precondition violated"));
    }

    #[test]
    fn test_internal_inconsistency() {
        let err = Error::internal("valid size 3 != 2");
        assert!(matches!(err, Error::InternalInconsistency { .. }));
        assert!(err.to_string().contains("valid size 3 != 2"));
    }

    #[test]
    fn test_feature_error() {
        let err = Error::feature("11 atoms exceeds max_atoms 10");
        assert!(err.to_string().contains("max_atoms"));
    }

    #[test]
    fn test_empty_dataset_display() {
        assert_eq!(Error::EmptyDataset.to_string(), "Dataset is empty");
    }

    #[test]
    fn test_arrow_error_conversion() {
        let arrow_err = arrow::error::ArrowError::ComputeError("boom".to_string());
        let err: Error = arrow_err.into();
        assert!(matches!(err, Error::Arrow(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}

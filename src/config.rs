//! Split configuration files.
//!
//! A [`SplitConfig`] bundles the split fractions and the stratification
//! options into one flat JSON object:
//!
//! ```json
//! {
//!   "frac_train": 0.8,
//!   "frac_valid": 0.1,
//!   "frac_test": 0.1,
//!   "label_column": { "name": "gap" },
//!   "task_type": "regression",
//!   "n_bin": 10,
//!   "seed": 42
//! }
//! ```
//!
//! Every key is optional; missing keys take the library defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    split::{SplitFractions, StratifiedOptions, StratifiedSplitter},
};

/// Fractions plus stratification options, as read from a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Train/validation/test fractions.
    #[serde(flatten)]
    pub fractions: SplitFractions,
    /// Label and task settings.
    #[serde(flatten)]
    pub options: StratifiedOptions,
}

impl SplitConfig {
    /// Parses a config from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed JSON or fractions that do not
    /// sum to 1.0.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise see
    /// [`Self::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        Self::from_json_str(&contents)
    }

    /// Builds the splitter these options describe.
    pub fn splitter(&self) -> StratifiedSplitter {
        StratifiedSplitter::with_options(self.options.clone())
    }
}

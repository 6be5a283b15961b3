//! Reader for the ESO plain-text output format.
//!
//! An ESO file is a preamble, a data dictionary terminated by
//! `End of Data Dictionary`, then interleaved data lines whose first field
//! repeats the series index from the dictionary. [`EsoFile`] parses the
//! dictionary once on open and re-streams the file for each series request.

pub mod header;
pub mod series;

pub use header::{DataDictionary, parse_dictionary, parse_header_line, read_dictionary};
pub use series::extract_series;

use crate::config::ExtractConfig;
use crate::error::{Result, ResultsError};
use crate::models::{EsoSeries, SeriesDescriptor};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

/// An ESO file with its parsed data dictionary
#[derive(Debug, Clone)]
pub struct EsoFile {
    path: PathBuf,
    dictionary: DataDictionary,
}

impl EsoFile {
    /// Open an ESO file with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, &ExtractConfig::default())
    }

    /// Open an ESO file, parsing its data dictionary
    pub fn open_with_config(path: impl AsRef<Path>, config: &ExtractConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let dictionary = read_dictionary(&path, config.eso_preamble_lines)?;

        info!(
            "Opened {} with {} series",
            path.display(),
            dictionary.descriptors.len()
        );

        Ok(Self { path, dictionary })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dictionary(&self) -> &DataDictionary {
        &self.dictionary
    }

    /// Every series declared in the dictionary
    pub fn available_series(&self) -> &[SeriesDescriptor] {
        &self.dictionary.descriptors
    }

    /// Series whose descriptor fields contain `filter` (case-sensitive)
    pub fn find_series(&self, filter: &str) -> Vec<&SeriesDescriptor> {
        self.dictionary
            .descriptors
            .iter()
            .filter(|d| d.matches(filter))
            .collect()
    }

    /// Look up the descriptor of a series
    pub fn descriptor(&self, index: u32) -> Result<&SeriesDescriptor> {
        self.dictionary
            .descriptors
            .iter()
            .find(|d| d.index == index)
            .ok_or_else(|| ResultsError::SeriesNotFound {
                index: index.to_string(),
                path: self.path.clone(),
            })
    }

    /// Extract one series, shaped by its reporting period
    pub fn get_series(&self, index: u32) -> Result<EsoSeries> {
        let descriptor = self.descriptor(index)?;
        let file = File::open(&self.path)?;
        extract_series(BufReader::new(file), descriptor, &self.path)
    }
}

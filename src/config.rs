//! Configuration for result extraction.
//!
//! Holds the unit system, time-axis parameters and file naming conventions
//! shared by the ESO reader and the relational store extractors.

use crate::constants::{
    DEFAULT_AXIS_YEAR, DEFAULT_INTERVAL_MINUTES, DEFAULT_LABEL_SEPARATOR,
    DEFAULT_REPORTING_FREQUENCY, ESO_PREAMBLE_LINES, NODE_FILE_EXTENSION, STORE_EXTENSION,
};
use crate::error::{Result, ResultsError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Unit system of extracted time series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    /// Values exactly as the simulation engine wrote them
    Si,
    /// Inch-pound units via the conversion engine
    #[default]
    Ip,
}

/// Extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Unit system of returned time series
    pub unit_system: UnitSystem,

    /// `ReportingFrequency` value selected from the report data dictionary
    pub reporting_frequency: String,

    /// `Interval` (minutes) selected from the time table
    pub time_interval_minutes: i64,

    /// Year stamped onto time-axis labels
    pub axis_year: i32,

    /// File-level preamble lines at the top of an ESO dictionary
    pub eso_preamble_lines: usize,

    /// Extension appended to store paths that lack one
    pub store_extension: String,

    /// Extension of the node description file next to the store
    pub node_file_extension: String,

    /// Separator used when flattening composite column labels
    pub label_separator: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            unit_system: UnitSystem::Ip,
            reporting_frequency: DEFAULT_REPORTING_FREQUENCY.to_string(),
            time_interval_minutes: DEFAULT_INTERVAL_MINUTES,
            axis_year: DEFAULT_AXIS_YEAR,
            eso_preamble_lines: ESO_PREAMBLE_LINES,
            store_extension: STORE_EXTENSION.to_string(),
            node_file_extension: NODE_FILE_EXTENSION.to_string(),
            label_separator: DEFAULT_LABEL_SEPARATOR.to_string(),
        }
    }
}

impl ExtractConfig {
    /// Return values in the engine's native SI units
    pub fn with_si_units(mut self) -> Self {
        self.unit_system = UnitSystem::Si;
        self
    }

    /// Set the unit system
    pub fn with_unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.unit_system = unit_system;
        self
    }

    /// Select a different reporting frequency from the dictionary
    pub fn with_reporting_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.reporting_frequency = frequency.into();
        self
    }

    /// Select a different time-table interval
    pub fn with_time_interval(mut self, minutes: i64) -> Self {
        self.time_interval_minutes = minutes;
        self
    }

    /// Stamp a specific year onto time-axis labels
    pub fn with_axis_year(mut self, year: i32) -> Self {
        self.axis_year = year;
        self
    }

    /// Number of preamble lines before the ESO dictionary
    pub fn with_eso_preamble_lines(mut self, lines: usize) -> Self {
        self.eso_preamble_lines = lines;
        self
    }

    /// Set the separator for flattened column labels
    pub fn with_label_separator(mut self, separator: impl Into<String>) -> Self {
        self.label_separator = separator.into();
        self
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.reporting_frequency.trim().is_empty() {
            return Err(ResultsError::Configuration {
                message: "reporting_frequency must not be empty".to_string(),
            });
        }

        if self.time_interval_minutes <= 0 {
            return Err(ResultsError::Configuration {
                message: format!(
                    "time_interval_minutes must be positive, got {}",
                    self.time_interval_minutes
                ),
            });
        }

        if self.store_extension.is_empty() || self.node_file_extension.is_empty() {
            return Err(ResultsError::Configuration {
                message: "file extensions must not be empty".to_string(),
            });
        }

        if self.label_separator.is_empty() {
            return Err(ResultsError::Configuration {
                message: "label_separator must not be empty".to_string(),
            });
        }

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }
}

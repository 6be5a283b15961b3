//! Error handling for simulation result extraction.
//!
//! Provides typed errors with enough context (series index, string key,
//! file path) to diagnose failures in ESO parsing, string resolution and
//! time-series extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an error, for callers that only need to branch
/// on the kind of failure rather than on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Lookup,
    Schema,
    Io,
    Configuration,
}

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Invalid dictionary line {line} in file: {path} - {reason}")]
    InvalidHeader {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("No 'End of Data Dictionary' line found in file: {path}")]
    MissingDictionaryEnd { path: PathBuf },

    #[error("Malformed row for series {index}: expected {expected} fields, found {found}")]
    ColumnArity {
        index: String,
        expected: usize,
        found: usize,
    },

    #[error("Non-numeric value '{value}' in field {field} of series {index}")]
    InvalidValue {
        index: String,
        field: usize,
        value: String,
    },

    #[error("Invalid timestamp for time index {time_index}: {reason}")]
    InvalidTimestamp { time_index: i64, reason: String },

    #[error("Series {index} not found in dictionary of file: {path}")]
    SeriesNotFound { index: String, path: PathBuf },

    #[error("Series {index} has no data rows in file: {path}")]
    EmptySeries { index: String, path: PathBuf },

    #[error("Unknown reporting period '{period}' for series {index}")]
    UnknownReportingPeriod { index: String, period: String },

    #[error("String '{value}' not found for string type {string_type}")]
    StringNotFound { string_type: String, value: String },

    #[error("String '{value}' is ambiguous for string type {string_type}: {count} matches")]
    AmbiguousString {
        string_type: String,
        value: String,
        count: usize,
    },

    #[error("Tabular report not found: {key}")]
    ReportNotFound { key: String },

    #[error("String index {id} does not resolve to a value")]
    UnresolvedString { id: i64 },

    #[error("Series ids not present in the report data dictionary: {ids:?}")]
    UnknownSeriesIds { ids: Vec<i64> },

    #[error("Series selection is empty")]
    EmptySelection,

    #[error("No report data matched the time table (store may be partial or malformed)")]
    EmptyTimeJoin,

    #[error("Table '{table}' not found in output store")]
    MissingTable { table: String },

    #[error("Column '{column}' not found in table '{table}'")]
    MissingColumn { table: String, column: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ResultsError {
    /// Map a variant onto the format / lookup / schema taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResultsError::InvalidHeader { .. }
            | ResultsError::MissingDictionaryEnd { .. }
            | ResultsError::ColumnArity { .. }
            | ResultsError::InvalidValue { .. }
            | ResultsError::InvalidTimestamp { .. } => ErrorKind::Format,

            ResultsError::SeriesNotFound { .. }
            | ResultsError::EmptySeries { .. }
            | ResultsError::StringNotFound { .. }
            | ResultsError::AmbiguousString { .. }
            | ResultsError::UnresolvedString { .. }
            | ResultsError::ReportNotFound { .. }
            | ResultsError::UnknownSeriesIds { .. }
            | ResultsError::EmptySelection
            | ResultsError::EmptyTimeJoin => ErrorKind::Lookup,

            ResultsError::UnknownReportingPeriod { .. }
            | ResultsError::MissingTable { .. }
            | ResultsError::MissingColumn { .. }
            | ResultsError::Sqlite(_)
            | ResultsError::Polars(_) => ErrorKind::Schema,

            ResultsError::Io(_) => ErrorKind::Io,
            ResultsError::Configuration { .. } => ErrorKind::Configuration,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResultsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = ResultsError::ColumnArity {
            index: "7".to_string(),
            expected: 1,
            found: 2,
        };
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(
            err.to_string(),
            "Malformed row for series 7: expected 1 fields, found 2"
        );

        assert_eq!(ResultsError::EmptySelection.kind(), ErrorKind::Lookup);
        assert_eq!(
            ResultsError::UnknownReportingPeriod {
                index: "9".to_string(),
                period: "TimeStep".to_string(),
            }
            .kind(),
            ErrorKind::Schema
        );
    }
}

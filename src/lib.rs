//! EnergyPlus Results Library
//!
//! A Rust library for turning building-energy simulation output into tidy,
//! labelled tables with physically meaningful units.
//!
//! This library provides tools for:
//! - Parsing ESO text reports: the header dictionary and per-series data rows
//! - Reconstructing tabular reports from the string-interned SQLite output store
//! - Extracting hourly time series from the store and pivoting them by series
//! - Classifying series units by fluid domain and converting SI to inch-pound
//! - Materialising every result as a polars DataFrame

pub mod config;
pub mod constants;
pub mod error;
pub mod eso;
pub mod frame;
pub mod logging;
pub mod models;
pub mod store;
pub mod units;

// Re-export commonly used types
pub use config::{ExtractConfig, UnitSystem};
pub use error::{ErrorKind, Result, ResultsError};
pub use eso::EsoFile;
pub use logging::init_logging;
pub use models::{
    CellValue, ColumnLabel, DictionaryEntry, EsoSeries, ReportingPeriod, SeriesDescriptor,
    SeriesKey, TabularReport, TabularReportKey, TimeSeriesFrame,
};
pub use store::{OutputStore, SeriesSelection, TabularExtractor, TimeSeriesExtractor};
pub use units::{ColumnConversion, ConversionOutcome, Domain, NodeTypeMap, UnitConverter};

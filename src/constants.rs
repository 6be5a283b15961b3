//! Fixed external contracts of the EnergyPlus output formats.
//!
//! Sentinel lines, string-type tags, relational table names and the
//! keyword sets used by the unit classifier.

// =============================================================================
// ESO Text Format
// =============================================================================

/// Line terminating the header dictionary of an ESO file
pub const END_OF_DICTIONARY: &str = "End of Data Dictionary";

/// Line terminating the data section of an ESO file
pub const END_OF_DATA: &str = "End of Data";

/// Number of file-level preamble lines preceding the series dictionary
pub const ESO_PREAMBLE_LINES: usize = 7;

/// Separator between the dictionary fields and the period description
pub const PERIOD_MARKER: char = '!';

// =============================================================================
// Relational Output Store
// =============================================================================

/// Default extension of the relational output store
pub const STORE_EXTENSION: &str = "sql";

/// Default extension of the branch/node description file
pub const NODE_FILE_EXTENSION: &str = "bnd";

pub mod tables {
    pub const STRINGS: &str = "Strings";
    pub const TABULAR_DATA: &str = "TabularData";
    pub const SIMULATIONS: &str = "Simulations";
    pub const REPORT_DATA_DICTIONARY: &str = "ReportDataDictionary";
    pub const REPORT_DATA: &str = "ReportData";
    pub const TIME: &str = "Time";
}

/// Primary identifier of `TabularData`, never resolved against `Strings`
pub const TABULAR_PRIMARY_KEY: &str = "TabularDataIndex";

/// Index columns of `TabularData` that reference other tables, not `Strings`
pub const NON_STRING_INDEX_COLUMNS: &[&str] = &["SimulationIndex"];

/// Marker identifying string-id columns in `TabularData`
pub const INDEX_MARKER: &str = "Index";

/// Columns of `ReportDataDictionary`, in the order they are exposed
pub const DICTIONARY_COLUMNS: &[&str] = &[
    "ReportDataDictionaryIndex",
    "IsMeter",
    "Type",
    "IndexGroup",
    "TimestepType",
    "KeyValue",
    "Name",
    "ReportingFrequency",
    "ScheduleName",
    "Units",
];

/// Default reporting frequency of extracted time series
pub const DEFAULT_REPORTING_FREQUENCY: &str = "Hourly";

/// Default time-table granularity in minutes
pub const DEFAULT_INTERVAL_MINUTES: i64 = 60;

/// The time table carries no year; labels use a leap year so Feb 29 rows
/// from leap-year weather files have a date.
pub const DEFAULT_AXIS_YEAR: i32 = 2000;

// =============================================================================
// Node Description File
// =============================================================================

/// First-field values marking a node declaration (case-folded, spaces removed)
pub const NODE_MARKERS: &[&str] = &["NODE", "SUSPICIOUSNODE"];

/// Field offset of the node name in a node declaration line
pub const NODE_NAME_FIELD: usize = 2;

/// Field offset of the fluid type in a node declaration line
pub const NODE_FLUID_FIELD: usize = 3;

// =============================================================================
// Unit Classification
// =============================================================================

/// Keywords signalling an air-side series, matched case-insensitively
pub const AIR_KEYWORDS: &[&str] = &["air outlet", "air inlet", "air"];

/// Keywords signalling a water-side series, matched case-insensitively
pub const WATER_KEYWORDS: &[&str] = &["water outlet", "water inlet", "water"];

/// Default separator used when flattening composite column labels
pub const DEFAULT_LABEL_SEPARATOR: &str = " | ";

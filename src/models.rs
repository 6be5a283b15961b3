//! Core data structures for extracted simulation results.
//!
//! Defines ESO series descriptors and rows, tabular report identities and
//! cell matrices, report data dictionary entries and the pivoted
//! time-series frame handed to downstream consumers.

use crate::error::{Result, ResultsError};
use crate::units::ColumnConversion;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ESO Text Format
// =============================================================================

/// Reporting granularity of an ESO series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportingPeriod {
    Hourly,
    Daily,
    Monthly,
    RunPeriod,
}

impl ReportingPeriod {
    /// Parse the period token of a dictionary line
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Hourly" => Some(ReportingPeriod::Hourly),
            "Daily" => Some(ReportingPeriod::Daily),
            "Monthly" => Some(ReportingPeriod::Monthly),
            "RunPeriod" => Some(ReportingPeriod::RunPeriod),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportingPeriod::Hourly => "Hourly",
            ReportingPeriod::Daily => "Daily",
            ReportingPeriod::Monthly => "Monthly",
            ReportingPeriod::RunPeriod => "RunPeriod",
        }
    }

    /// Column names of a data row, excluding the leading series index.
    ///
    /// Extrema timestamps are prefixed with `Min`/`Max` so names stay unique.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ReportingPeriod::Hourly => &["Value"],
            ReportingPeriod::Daily => &[
                "Value", "Min", "MinHour", "MinMinute", "Max", "MaxHour", "MaxMinute",
            ],
            ReportingPeriod::Monthly => &[
                "Value",
                "Min",
                "MinDay",
                "MinHour",
                "MinMinute",
                "Max",
                "MaxDay",
                "MaxHour",
                "MaxMinute",
            ],
            ReportingPeriod::RunPeriod => &[
                "Value",
                "Min",
                "MinMonth",
                "MinDay",
                "MinHour",
                "MinMinute",
                "Max",
                "MaxMonth",
                "MaxDay",
                "MaxHour",
                "MaxMinute",
            ],
        }
    }

    /// Number of fields in a data row
    pub fn arity(&self) -> usize {
        self.columns().len()
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One series declared in the ESO data dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDescriptor {
    /// Series id, unique within one file
    pub index: u32,
    /// Raw period token following the `!` marker
    pub period_label: String,
    /// Equipment or node name
    pub key_value: String,
    /// Quantity name, including the bracketed unit
    pub name: String,
    /// Number-of-values marker from the second field
    pub period_type: String,
}

impl SeriesDescriptor {
    /// Resolve the period token to a known schema
    pub fn reporting_period(&self) -> Result<ReportingPeriod> {
        ReportingPeriod::from_label(&self.period_label).ok_or_else(|| {
            ResultsError::UnknownReportingPeriod {
                index: self.index.to_string(),
                period: self.period_label.clone(),
            }
        })
    }

    /// Display name in the form `"<key>, <name>"`
    pub fn series_name(&self) -> String {
        format!("{}, {}", self.key_value, self.name)
    }

    /// Unit from the trailing `[unit]` of the name, empty when absent
    pub fn units(&self) -> &str {
        let name = self.name.trim_end();
        match (name.rfind('['), name.ends_with(']')) {
            (Some(open), true) => name[open + 1..name.len() - 1].trim(),
            _ => "",
        }
    }

    /// True when any field contains `filter` (case-sensitive)
    pub fn matches(&self, filter: &str) -> bool {
        self.index.to_string().contains(filter)
            || self.period_label.contains(filter)
            || self.key_value.contains(filter)
            || self.name.contains(filter)
            || self.period_type.contains(filter)
    }
}

/// One data row of an ESO series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsoRow {
    /// Position of the row within its series
    pub ordinal: usize,
    /// Fields following the series index, in schema order
    pub values: Vec<f64>,
}

/// A series extracted from an ESO file
#[derive(Debug, Clone, PartialEq)]
pub struct EsoSeries {
    pub descriptor: SeriesDescriptor,
    pub period: ReportingPeriod,
    pub rows: Vec<EsoRow>,
}

impl EsoSeries {
    pub fn columns(&self) -> &'static [&'static str] {
        self.period.columns()
    }

    /// The `Value` field of every row
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.values[0]).collect()
    }
}

// =============================================================================
// Relational Output Store: Tabular Reports
// =============================================================================

/// Type tag of an entry in the `Strings` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringType {
    ReportName,
    ReportForString,
    TableName,
    RowName,
    ColumnName,
    Units,
}

impl StringType {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            1 => Some(StringType::ReportName),
            2 => Some(StringType::ReportForString),
            3 => Some(StringType::TableName),
            4 => Some(StringType::RowName),
            5 => Some(StringType::ColumnName),
            6 => Some(StringType::Units),
            _ => None,
        }
    }

    /// `StringTypeIndex` value stored in the `Strings` table
    pub fn index(&self) -> i64 {
        match self {
            StringType::ReportName => 1,
            StringType::ReportForString => 2,
            StringType::TableName => 3,
            StringType::RowName => 4,
            StringType::ColumnName => 5,
            StringType::Units => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StringType::ReportName => "ReportName",
            StringType::ReportForString => "ReportForString",
            StringType::TableName => "TableName",
            StringType::RowName => "RowName",
            StringType::ColumnName => "ColumnName",
            StringType::Units => "Units",
        }
    }
}

impl fmt::Display for StringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Composite identity of one tabular report
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabularReportKey {
    pub report_name: String,
    pub report_for: String,
    pub table_name: String,
}

impl TabularReportKey {
    pub fn new(
        report_name: impl Into<String>,
        report_for: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            report_name: report_name.into(),
            report_for: report_for.into(),
            table_name: table_name.into(),
        }
    }

    /// True when any part of the key contains `filter` (case-sensitive)
    pub fn matches(&self, filter: &str) -> bool {
        self.report_name.contains(filter)
            || self.report_for.contains(filter)
            || self.table_name.contains(filter)
    }
}

impl fmt::Display for TabularReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {}",
            self.report_name, self.report_for, self.table_name
        )
    }
}

/// A tabular report cell, coerced to a number where it parses as one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Parse a raw cell; inner spaces are ignored, failures keep the text.
    pub fn coerce(raw: &str) -> Self {
        let compact: String = raw.trim().chars().filter(|c| *c != ' ').collect();
        match compact.parse::<f64>() {
            Ok(number) => CellValue::Number(number),
            Err(_) => CellValue::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Empty => Ok(()),
        }
    }
}

/// Column label of a tabular report
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnLabel {
    pub name: String,
    pub units: String,
}

impl ColumnLabel {
    pub fn new(name: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
        }
    }

    /// Flattened label; unitless columns keep the bare name
    pub fn label(&self, separator: &str) -> String {
        if self.units.is_empty() {
            self.name.clone()
        } else {
            format!("{}{}{}", self.name, separator, self.units)
        }
    }
}

/// A tabular report pivoted into a row x column cell matrix
#[derive(Debug, Clone, PartialEq)]
pub struct TabularReport {
    pub key: TabularReportKey,
    pub row_labels: Vec<String>,
    pub columns: Vec<ColumnLabel>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<CellValue>>,
}

impl TabularReport {
    pub fn row_count(&self) -> usize {
        self.row_labels.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Look up a cell by row label and column name
    pub fn cell(&self, row: &str, column: &str) -> Option<&CellValue> {
        let row_idx = self.row_labels.iter().position(|r| r == row)?;
        let col_idx = self.columns.iter().position(|c| c.name == column)?;
        self.cells.get(row_idx)?.get(col_idx)
    }
}

// =============================================================================
// Relational Output Store: Time Series
// =============================================================================

/// One row of the report data dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub index: i64,
    pub is_meter: bool,
    pub kind: String,
    pub index_group: String,
    pub timestep_type: String,
    pub key_value: String,
    pub name: String,
    pub reporting_frequency: String,
    pub schedule_name: Option<String>,
    pub units: String,
}

impl DictionaryEntry {
    /// Composite identity used as the pivoted column key
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey {
            index_group: self.index_group.clone(),
            timestep_type: self.timestep_type.clone(),
            key_value: self.key_value.clone(),
            name: self.name.clone(),
            units: self.units.clone(),
        }
    }

    /// True when any field, stringified, contains `filter` (case-sensitive)
    pub fn matches(&self, filter: &str) -> bool {
        self.index.to_string().contains(filter)
            || (if self.is_meter { "1" } else { "0" }).contains(filter)
            || self.kind.contains(filter)
            || self.index_group.contains(filter)
            || self.timestep_type.contains(filter)
            || self.key_value.contains(filter)
            || self.name.contains(filter)
            || self.reporting_frequency.contains(filter)
            || self
                .schedule_name
                .as_deref()
                .is_some_and(|s| s.contains(filter))
            || self.units.contains(filter)
    }
}

/// Composite (group, timestep type, key, name, units) column identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub index_group: String,
    pub timestep_type: String,
    pub key_value: String,
    pub name: String,
    pub units: String,
}

impl SeriesKey {
    pub fn label(&self, separator: &str) -> String {
        [
            self.index_group.as_str(),
            self.timestep_type.as_str(),
            self.key_value.as_str(),
            self.name.as_str(),
            self.units.as_str(),
        ]
        .join(separator)
    }
}

/// One pivoted series column
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesColumn {
    pub key: SeriesKey,
    /// One value per timestamp; `None` where the series has no point
    pub values: Vec<Option<f64>>,
}

/// Time series pivoted wide and indexed by timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesFrame {
    pub timestamps: Vec<NaiveDateTime>,
    pub columns: Vec<SeriesColumn>,
    /// Per-column conversion record; empty when no conversion ran
    pub conversions: Vec<ColumnConversion>,
}

impl TimeSeriesFrame {
    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn column(&self, key_value: &str, name: &str) -> Option<&SeriesColumn> {
        self.columns
            .iter()
            .find(|c| c.key.key_value == key_value && c.key.name == name)
    }
}

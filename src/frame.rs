//! Materialisation of extracted results as polars DataFrames.
//!
//! Composite column labels are flattened with a separator and made unique,
//! so every frame produced here has distinct column names.

use crate::error::{Result, ResultsError};
use crate::models::{
    CellValue, EsoSeries, SeriesDescriptor, TabularReport, TabularReportKey, TimeSeriesFrame,
};
use crate::store::{RawTable, value_as_f64, value_as_i64, value_as_string};
use polars::prelude::*;
use rusqlite::types::Value;
use std::collections::HashSet;

pub const ORDINAL_COLUMN: &str = "Ordinal";
pub const ROW_NAME_COLUMN: &str = "RowName";
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Identity columns attached to every tabular report frame
pub const REPORT_NAME_COLUMN: &str = "ReportName";
pub const REPORT_FOR_COLUMN: &str = "ReportForString";
pub const TABLE_NAME_COLUMN: &str = "TableName";

/// Hands out column names, suffixing repeats with `_2`, `_3`, ...
#[derive(Debug, Default)]
struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", name, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn datetime_column(name: &str, stamps: &[chrono::NaiveDateTime]) -> Result<Column> {
    let millis: Vec<i64> = stamps
        .iter()
        .map(|stamp| stamp.and_utc().timestamp_millis())
        .collect();
    let column = Column::new(name.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok(column)
}

impl SeriesDescriptor {
    /// Single-row frame describing the series
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = DataFrame::new(vec![
            Column::new("Index".into(), vec![i64::from(self.index)]),
            Column::new("ReportingPeriod".into(), vec![self.period_label.as_str()]),
            Column::new("KeyValue".into(), vec![self.key_value.as_str()]),
            Column::new("Name".into(), vec![self.name.as_str()]),
            Column::new("Units".into(), vec![self.units()]),
            Column::new("Type".into(), vec![self.period_type.as_str()]),
        ])?;
        Ok(df)
    }
}

impl EsoSeries {
    /// One row per data line, one column per period field
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let ordinals: Vec<u64> = self.rows.iter().map(|row| row.ordinal as u64).collect();
        let mut columns = vec![Column::new(ORDINAL_COLUMN.into(), ordinals)];

        for (pos, name) in self.columns().iter().enumerate() {
            let values: Vec<f64> = self.rows.iter().map(|row| row.values[pos]).collect();
            columns.push(Column::new((*name).into(), values));
        }

        Ok(DataFrame::new(columns)?)
    }
}

impl TabularReport {
    /// Wide frame: a `RowName` column, one column per (name, units) label
    /// and the three identity columns.
    ///
    /// Columns holding only numbers are `f64`; any text makes the column a
    /// string column.
    pub fn to_dataframe(&self, separator: &str) -> Result<DataFrame> {
        let mut names = UniqueNames::default();
        let mut columns = vec![Column::new(
            names.claim(ROW_NAME_COLUMN).into(),
            self.row_labels.clone(),
        )];

        for (pos, label) in self.columns.iter().enumerate() {
            let name = names.claim(&label.label(separator));
            let cells: Vec<&CellValue> = self.cells.iter().map(|row| &row[pos]).collect();

            let numeric = cells
                .iter()
                .all(|cell| matches!(cell, CellValue::Number(_) | CellValue::Empty));
            let column = if numeric {
                let values: Vec<Option<f64>> = cells.iter().map(|cell| cell.as_f64()).collect();
                Column::new(name.into(), values)
            } else {
                let values: Vec<Option<String>> = cells
                    .iter()
                    .map(|cell| match cell {
                        CellValue::Empty => None,
                        other => Some(other.to_string()),
                    })
                    .collect();
                Column::new(name.into(), values)
            };
            columns.push(column);
        }

        let rows = self.row_count();
        for (name, value) in [
            (REPORT_NAME_COLUMN, &self.key.report_name),
            (REPORT_FOR_COLUMN, &self.key.report_for),
            (TABLE_NAME_COLUMN, &self.key.table_name),
        ] {
            columns.push(Column::new(
                names.claim(name).into(),
                vec![value.as_str(); rows],
            ));
        }

        Ok(DataFrame::new(columns)?)
    }
}

impl TabularReportKey {
    /// Re-derive the key from a frame's identity columns
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let first = |name: &str| -> Result<String> {
            df.column(name)?
                .str()?
                .get(0)
                .map(str::to_string)
                .ok_or_else(|| ResultsError::MissingColumn {
                    table: "tabular report frame".to_string(),
                    column: name.to_string(),
                })
        };

        Ok(Self::new(
            first(REPORT_NAME_COLUMN)?,
            first(REPORT_FOR_COLUMN)?,
            first(TABLE_NAME_COLUMN)?,
        ))
    }
}

impl TimeSeriesFrame {
    /// Wide frame indexed by a `Timestamp` column, one column per series
    pub fn to_dataframe(&self, separator: &str) -> Result<DataFrame> {
        let mut names = UniqueNames::default();
        let mut columns = vec![datetime_column(
            &names.claim(TIMESTAMP_COLUMN),
            &self.timestamps,
        )?];

        for series in &self.columns {
            let name = names.claim(&series.key.label(separator));
            columns.push(Column::new(name.into(), series.values.clone()));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Long frame with one row per (timestamp, series) point present
    pub fn to_long_dataframe(&self) -> Result<DataFrame> {
        let mut stamps = Vec::new();
        let mut groups = Vec::new();
        let mut timesteps = Vec::new();
        let mut keys = Vec::new();
        let mut names = Vec::new();
        let mut units = Vec::new();
        let mut values = Vec::new();

        for (row, stamp) in self.timestamps.iter().enumerate() {
            for series in &self.columns {
                let Some(value) = series.values[row] else {
                    continue;
                };
                stamps.push(*stamp);
                groups.push(series.key.index_group.as_str());
                timesteps.push(series.key.timestep_type.as_str());
                keys.push(series.key.key_value.as_str());
                names.push(series.key.name.as_str());
                units.push(series.key.units.as_str());
                values.push(value);
            }
        }

        let df = DataFrame::new(vec![
            datetime_column(TIMESTAMP_COLUMN, &stamps)?,
            Column::new("IndexGroup".into(), groups),
            Column::new("TimestepType".into(), timesteps),
            Column::new("KeyValue".into(), keys),
            Column::new("Name".into(), names),
            Column::new("Units".into(), units),
            Column::new("Value".into(), values),
        ])?;
        Ok(df)
    }
}

/// Convert a raw query result, typing each column by its contents.
///
/// All-integer columns become `i64`, all-numeric columns `f64` and anything
/// else a string column. NULL becomes a null in every case.
pub fn raw_table_to_dataframe(table: &RawTable) -> Result<DataFrame> {
    let mut names = UniqueNames::default();
    let mut columns = Vec::with_capacity(table.columns.len());

    for (pos, name) in table.columns.iter().enumerate() {
        let cells: Vec<&Value> = table.rows.iter().map(|row| &row[pos]).collect();
        let name = names.claim(name);

        let all_integer = cells
            .iter()
            .all(|v| matches!(v, Value::Integer(_) | Value::Null));
        let all_numeric = cells
            .iter()
            .all(|v| matches!(v, Value::Integer(_) | Value::Real(_) | Value::Null));

        let column = if all_integer {
            let values: Vec<Option<i64>> = cells.iter().map(|v| value_as_i64(v)).collect();
            Column::new(name.into(), values)
        } else if all_numeric {
            let values: Vec<Option<f64>> = cells.iter().map(|v| value_as_f64(v)).collect();
            Column::new(name.into(), values)
        } else {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|v| match v {
                    Value::Null => None,
                    other => Some(value_as_string(other)),
                })
                .collect();
            Column::new(name.into(), values)
        };
        columns.push(column);
    }

    Ok(DataFrame::new(columns)?)
}

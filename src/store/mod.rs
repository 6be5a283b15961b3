//! Read-only access to the relational (SQLite) output store.
//!
//! Every query opens its own connection, materialises the result into a
//! [`RawTable`] and closes the connection before returning. No connection
//! is pooled or held across calls.

pub mod strings;
pub mod tabular;
pub mod time_axis;
pub mod timeseries;

#[cfg(test)]
pub mod tests;

pub use strings::{StringDictionary, StringEntry};
pub use tabular::TabularExtractor;
pub use time_axis::TimeAxis;
pub use timeseries::{SeriesSelection, TimeSeriesExtractor};

use crate::config::ExtractConfig;
use crate::constants::tables;
use crate::error::{Result, ResultsError};
use polars::prelude::DataFrame;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, params_from_iter};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A materialised query result
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    /// Position of a column, if present
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column, or a schema error naming `table`
    pub fn require(&self, table: &str, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| ResultsError::MissingColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Integer view of a cell; text holding an integer is accepted
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Real(r) if r.fract() == 0.0 => Some(*r as i64),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Floating-point view of a cell
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Real(r) => Some(*r),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text view of a cell; NULL becomes the empty string
pub fn value_as_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

/// Handle on one output store file
#[derive(Debug, Clone)]
pub struct OutputStore {
    path: PathBuf,
}

impl OutputStore {
    /// Open a store with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, &ExtractConfig::default())
    }

    /// Open a store; a path not mentioning the store extension gets it appended.
    pub fn open_with_config(path: impl AsRef<Path>, config: &ExtractConfig) -> Result<Self> {
        let path = normalize_store_path(path.as_ref(), &config.store_extension);

        // Opening read-only must not create an empty database in its place.
        std::fs::metadata(&path)?;

        debug!("Using output store {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a sibling file sharing the store's stem
    pub fn sibling(&self, extension: &str) -> PathBuf {
        self.path.with_extension(extension)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    /// Run a query and materialise every row
    pub fn query_table(&self, sql: &str, params: &[Value]) -> Result<RawTable> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query(params_from_iter(params.iter()))?;
        while let Some(row) = cursor.next()? {
            let values = (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<Value>>>()?;
            rows.push(values);
        }

        debug!("Query returned {} rows: {}", rows.len(), sql);
        Ok(RawTable { columns, rows })
    }

    /// Fail with a schema error unless `table` exists with all `columns`
    pub fn require_columns(&self, table: &str, columns: &[&str]) -> Result<()> {
        let info = self.query_table(
            "SELECT name FROM pragma_table_info(?1)",
            &[Value::Text(table.to_string())],
        )?;

        if info.is_empty() {
            return Err(ResultsError::MissingTable {
                table: table.to_string(),
            });
        }

        let present: Vec<String> = info.rows.iter().map(|r| value_as_string(&r[0])).collect();
        for column in columns {
            if !present.iter().any(|p| p == column) {
                return Err(ResultsError::MissingColumn {
                    table: table.to_string(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// The `Simulations` table as returned by the store
    pub fn simulations(&self) -> Result<DataFrame> {
        self.require_columns(tables::SIMULATIONS, &[])?;
        let table = self.query_table(&format!("SELECT * FROM {}", tables::SIMULATIONS), &[])?;
        crate::frame::raw_table_to_dataframe(&table)
    }
}

fn normalize_store_path(path: &Path, extension: &str) -> PathBuf {
    let marker = format!(".{}", extension);
    if path.to_string_lossy().contains(&marker) {
        return path.to_path_buf();
    }

    let mut raw = OsString::from(path.as_os_str());
    raw.push(&marker);
    PathBuf::from(raw)
}

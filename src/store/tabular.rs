//! Tabular report extraction.
//!
//! A tabular report is identified by its (ReportName, ReportForString,
//! TableName) triple. Its cells live in `TabularData` as one row per cell,
//! addressed by `RowId`/`ColumnId`, with every label interned in `Strings`.

use super::strings::lookup_string_id;
use super::{OutputStore, RawTable, StringDictionary, value_as_i64, value_as_string};
use crate::config::ExtractConfig;
use crate::constants::tables;
use crate::error::{Result, ResultsError};
use crate::models::{CellValue, ColumnLabel, StringType, TabularReport, TabularReportKey};
use rusqlite::types::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Extracts tabular reports from one output store
#[derive(Debug)]
pub struct TabularExtractor {
    store: OutputStore,
    strings: OnceLock<StringDictionary>,
}

impl TabularExtractor {
    pub fn new(store: OutputStore) -> Self {
        Self {
            store,
            strings: OnceLock::new(),
        }
    }

    /// Open the store at `path` with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(OutputStore::open(path)?))
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: &ExtractConfig) -> Result<Self> {
        Ok(Self::new(OutputStore::open_with_config(path, config)?))
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    /// The string pool, loaded on first use and kept for this extractor
    pub fn strings(&self) -> Result<&StringDictionary> {
        if let Some(strings) = self.strings.get() {
            return Ok(strings);
        }
        let loaded = StringDictionary::load(&self.store)?;
        Ok(self.strings.get_or_init(|| loaded))
    }

    /// Every distinct report key, in first-seen order
    pub fn available_reports(&self) -> Result<Vec<TabularReportKey>> {
        self.store.require_columns(
            tables::TABULAR_DATA,
            &["ReportNameIndex", "ReportForStringIndex", "TableNameIndex"],
        )?;

        let raw = self.store.query_table(
            "SELECT ReportNameIndex, ReportForStringIndex, TableNameIndex FROM TabularData",
            &[],
        )?;
        let resolved = self.strings()?.resolve_index_columns(raw)?;

        let report = resolved.require(tables::TABULAR_DATA, "ReportName")?;
        let report_for = resolved.require(tables::TABULAR_DATA, "ReportForString")?;
        let table = resolved.require(tables::TABULAR_DATA, "TableName")?;

        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for row in &resolved.rows {
            let key = TabularReportKey::new(
                value_as_string(&row[report]),
                value_as_string(&row[report_for]),
                value_as_string(&row[table]),
            );
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }

        info!("Found {} tabular reports", keys.len());
        Ok(keys)
    }

    /// Report keys with any part containing `filter` (case-sensitive)
    pub fn filter_reports(&self, filter: &str) -> Result<Vec<TabularReportKey>> {
        Ok(self
            .available_reports()?
            .into_iter()
            .filter(|key| key.matches(filter))
            .collect())
    }

    /// Fetch and pivot one report
    pub fn get_tabular(&self, key: &TabularReportKey) -> Result<TabularReport> {
        let report_id = lookup_string_id(&self.store, StringType::ReportName, &key.report_name)?;
        let report_for_id =
            lookup_string_id(&self.store, StringType::ReportForString, &key.report_for)?;
        let table_id = lookup_string_id(&self.store, StringType::TableName, &key.table_name)?;

        let raw = self.store.query_table(
            "SELECT * FROM TabularData \
             WHERE ReportNameIndex = ?1 AND ReportForStringIndex = ?2 AND TableNameIndex = ?3",
            &[
                Value::Integer(report_id),
                Value::Integer(report_for_id),
                Value::Integer(table_id),
            ],
        )?;

        if raw.is_empty() {
            return Err(ResultsError::ReportNotFound {
                key: key.to_string(),
            });
        }

        let resolved = self.strings()?.resolve_index_columns(raw)?;
        let report = pivot_report(key.clone(), &resolved)?;

        debug!(
            "Fetched report {}: {} rows x {} columns",
            key,
            report.row_count(),
            report.column_count()
        );
        Ok(report)
    }

    /// Fetch every report whose key contains `filter`
    pub fn search_tabular(&self, filter: &str) -> Result<Vec<TabularReport>> {
        self.filter_reports(filter)?
            .iter()
            .map(|key| self.get_tabular(key))
            .collect()
    }
}

/// Pivot resolved cell rows into a RowName x (ColumnName, Units) matrix.
///
/// Rows and columns are ordered by `RowId` and `ColumnId`.
pub fn pivot_report(key: TabularReportKey, table: &RawTable) -> Result<TabularReport> {
    let row_id = table.require(tables::TABULAR_DATA, "RowId")?;
    let column_id = table.require(tables::TABULAR_DATA, "ColumnId")?;
    let value = table.require(tables::TABULAR_DATA, "Value")?;
    let row_name = table.require(tables::TABULAR_DATA, "RowName")?;
    let column_name = table.require(tables::TABULAR_DATA, "ColumnName")?;
    let units = table.require(tables::TABULAR_DATA, "Units")?;

    let mut row_labels: BTreeMap<i64, String> = BTreeMap::new();
    let mut column_labels: BTreeMap<i64, ColumnLabel> = BTreeMap::new();
    let mut cells: HashMap<(i64, i64), String> = HashMap::new();

    for row in &table.rows {
        let (Some(r), Some(c)) = (value_as_i64(&row[row_id]), value_as_i64(&row[column_id]))
        else {
            warn!("Skipping tabular cell without row/column id in {}", key);
            continue;
        };

        row_labels
            .entry(r)
            .or_insert_with(|| value_as_string(&row[row_name]));
        column_labels.entry(c).or_insert_with(|| {
            ColumnLabel::new(value_as_string(&row[column_name]), value_as_string(&row[units]))
        });

        if cells.insert((r, c), value_as_string(&row[value])).is_some() {
            warn!("Duplicate cell ({}, {}) in {}; keeping the last", r, c, key);
        }
    }

    let matrix = row_labels
        .keys()
        .map(|r| {
            column_labels
                .keys()
                .map(|c| match cells.get(&(*r, *c)) {
                    Some(raw) => CellValue::coerce(raw),
                    None => CellValue::Empty,
                })
                .collect()
        })
        .collect();

    Ok(TabularReport {
        key,
        row_labels: row_labels.into_values().collect(),
        columns: column_labels.into_values().collect(),
        cells: matrix,
    })
}

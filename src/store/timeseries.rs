//! Time-series extraction from the report data tables.
//!
//! Series are declared in `ReportDataDictionary`, their points live in
//! `ReportData` keyed by (dictionary index, time index), and the time index
//! maps to calendar components through the `Time` table.

use super::{OutputStore, TimeAxis, value_as_f64, value_as_i64, value_as_string};
use crate::config::{ExtractConfig, UnitSystem};
use crate::constants::{DICTIONARY_COLUMNS, tables};
use crate::error::{Result, ResultsError};
use crate::models::{DictionaryEntry, SeriesColumn, SeriesKey, TimeSeriesFrame};
use crate::units::{NodeTypeMap, UnitConverter};
use rusqlite::types::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Which series to extract
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesSelection {
    /// Dictionary entries already filtered by the caller
    Entries(Vec<DictionaryEntry>),
    /// Case-sensitive substring filter over every dictionary field
    Filter(String),
    /// Explicit dictionary indices
    Ids(Vec<i64>),
}

impl From<&str> for SeriesSelection {
    fn from(filter: &str) -> Self {
        SeriesSelection::Filter(filter.to_string())
    }
}

impl From<String> for SeriesSelection {
    fn from(filter: String) -> Self {
        SeriesSelection::Filter(filter)
    }
}

impl From<Vec<i64>> for SeriesSelection {
    fn from(ids: Vec<i64>) -> Self {
        SeriesSelection::Ids(ids)
    }
}

impl From<Vec<DictionaryEntry>> for SeriesSelection {
    fn from(entries: Vec<DictionaryEntry>) -> Self {
        SeriesSelection::Entries(entries)
    }
}

/// One raw `ReportData` point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub series: i64,
    pub time_index: i64,
    pub value: f64,
}

/// Extracts pivoted time series from one output store
#[derive(Debug)]
pub struct TimeSeriesExtractor {
    store: OutputStore,
    config: ExtractConfig,
    converter: OnceLock<UnitConverter>,
}

impl TimeSeriesExtractor {
    pub fn new(store: OutputStore, config: ExtractConfig) -> Self {
        Self {
            store,
            config,
            converter: OnceLock::new(),
        }
    }

    /// Open the store at `path` with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, ExtractConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: ExtractConfig) -> Result<Self> {
        config.validate()?;
        let store = OutputStore::open_with_config(path, &config)?;
        Ok(Self::new(store, config))
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// The unit converter, with the node map loaded on first use
    pub fn converter(&self) -> Result<&UnitConverter> {
        if let Some(converter) = self.converter.get() {
            return Ok(converter);
        }
        let node_file = self.store.sibling(&self.config.node_file_extension);
        let converter = UnitConverter::new(NodeTypeMap::load(&node_file)?)?;
        Ok(self.converter.get_or_init(|| converter))
    }

    /// Every series reported at the configured frequency
    pub fn available_series(&self) -> Result<Vec<DictionaryEntry>> {
        self.store
            .require_columns(tables::REPORT_DATA_DICTIONARY, DICTIONARY_COLUMNS)?;

        let sql = format!(
            "SELECT {} FROM {} WHERE ReportingFrequency = ?1",
            DICTIONARY_COLUMNS.join(", "),
            tables::REPORT_DATA_DICTIONARY
        );
        let table = self
            .store
            .query_table(&sql, &[Value::Text(self.config.reporting_frequency.clone())])?;

        let mut entries = Vec::with_capacity(table.len());
        for row in &table.rows {
            match dictionary_entry(row) {
                Some(entry) => entries.push(entry),
                None => warn!("Skipping dictionary row without an index: {:?}", row),
            }
        }

        info!(
            "Found {} {} series",
            entries.len(),
            self.config.reporting_frequency
        );
        Ok(entries)
    }

    /// Dictionary entries with any field containing `filter` (case-sensitive)
    pub fn query_series(&self, filter: &str) -> Result<Vec<DictionaryEntry>> {
        Ok(self
            .available_series()?
            .into_iter()
            .filter(|entry| entry.matches(filter))
            .collect())
    }

    /// Extract the selected series as a frame indexed by timestamp.
    ///
    /// Values are converted to inch-pound units unless the configuration
    /// selects SI.
    pub fn get_series(&self, selection: impl Into<SeriesSelection>) -> Result<TimeSeriesFrame> {
        let entries = self.resolve_selection(selection.into())?;
        if entries.is_empty() {
            return Err(ResultsError::EmptySelection);
        }

        let points = self.load_points(&entries)?;
        let axis = TimeAxis::load(&self.store, &self.config)?;
        let mut frame = pivot_series(&entries, &points, &axis)?;

        match self.config.unit_system {
            UnitSystem::Ip => self.converter()?.convert_frame(&mut frame),
            UnitSystem::Si => debug!("Returning series in SI units"),
        }

        info!(
            "Extracted {} series over {} timestamps",
            frame.columns.len(),
            frame.row_count()
        );
        Ok(frame)
    }

    fn resolve_selection(&self, selection: SeriesSelection) -> Result<Vec<DictionaryEntry>> {
        let entries = match selection {
            SeriesSelection::Entries(entries) => entries,
            SeriesSelection::Filter(filter) => self.query_series(&filter)?,
            SeriesSelection::Ids(ids) => {
                let available: HashMap<i64, DictionaryEntry> = self
                    .available_series()?
                    .into_iter()
                    .map(|entry| (entry.index, entry))
                    .collect();

                let missing: Vec<i64> = ids
                    .iter()
                    .filter(|id| !available.contains_key(*id))
                    .copied()
                    .collect();
                if !missing.is_empty() {
                    return Err(ResultsError::UnknownSeriesIds { ids: missing });
                }

                ids.iter().filter_map(|id| available.get(id).cloned()).collect()
            }
        };

        let mut seen = HashSet::new();
        Ok(entries
            .into_iter()
            .filter(|entry| seen.insert(entry.index))
            .collect())
    }

    fn load_points(&self, entries: &[DictionaryEntry]) -> Result<Vec<DataPoint>> {
        self.store.require_columns(
            tables::REPORT_DATA,
            &["Value", "ReportDataDictionaryIndex", "TimeIndex"],
        )?;

        let placeholders = vec!["?"; entries.len()].join(", ");
        let sql = format!(
            "SELECT ReportDataDictionaryIndex, TimeIndex, Value FROM {} \
             WHERE ReportDataDictionaryIndex IN ({})",
            tables::REPORT_DATA,
            placeholders
        );
        let params: Vec<Value> = entries.iter().map(|e| Value::Integer(e.index)).collect();
        let table = self.store.query_table(&sql, &params)?;

        let mut points = Vec::with_capacity(table.len());
        for row in &table.rows {
            match (
                value_as_i64(&row[0]),
                value_as_i64(&row[1]),
                value_as_f64(&row[2]),
            ) {
                (Some(series), Some(time_index), Some(value)) => points.push(DataPoint {
                    series,
                    time_index,
                    value,
                }),
                _ => debug!("Skipping incomplete data point: {:?}", row),
            }
        }

        debug!("Loaded {} data points", points.len());
        Ok(points)
    }
}

fn dictionary_entry(row: &[Value]) -> Option<DictionaryEntry> {
    let schedule_name = match &row[8] {
        Value::Null => None,
        other => Some(value_as_string(other)),
    };

    Some(DictionaryEntry {
        index: value_as_i64(&row[0])?,
        is_meter: value_as_i64(&row[1]).is_some_and(|v| v != 0),
        kind: value_as_string(&row[2]),
        index_group: value_as_string(&row[3]),
        timestep_type: value_as_string(&row[4]),
        key_value: value_as_string(&row[5]),
        name: value_as_string(&row[6]),
        reporting_frequency: value_as_string(&row[7]),
        schedule_name,
        units: value_as_string(&row[9]),
    })
}

/// Pivot raw points into one column per series, joined to the time axis.
///
/// Columns are ordered by series key and rows by time index. Repeated
/// points for one (series key, time index) are averaged, including points
/// from distinct series that share a key; time indices absent from the axis
/// are dropped.
pub fn pivot_series(
    entries: &[DictionaryEntry],
    points: &[DataPoint],
    axis: &TimeAxis,
) -> Result<TimeSeriesFrame> {
    // Entries sharing a key feed the same column
    let mut keys: BTreeMap<SeriesKey, usize> = BTreeMap::new();
    let mut positions: HashMap<i64, usize> = HashMap::new();
    for entry in entries {
        let next = keys.len();
        let pos = *keys.entry(entry.series_key()).or_insert(next);
        if pos != next {
            debug!(
                "Series {} shares its key with another series; averaging into one column",
                entry.index
            );
        }
        positions.insert(entry.index, pos);
    }

    // (sum, count) per (time index, column position)
    let mut sums: HashMap<(i64, usize), (f64, u32)> = HashMap::new();
    let mut time_indices = BTreeSet::new();
    for point in points {
        let Some(&pos) = positions.get(&point.series) else {
            continue;
        };
        let cell = sums.entry((point.time_index, pos)).or_insert((0.0, 0));
        cell.0 += point.value;
        cell.1 += 1;
        time_indices.insert(point.time_index);
    }

    let mut rows = Vec::new();
    for time_index in time_indices {
        match axis.get(time_index) {
            Some(stamp) => rows.push((time_index, stamp)),
            None => debug!("Time index {} has no timestamp; dropped", time_index),
        }
    }

    if rows.is_empty() {
        return Err(ResultsError::EmptyTimeJoin);
    }

    let columns = keys
        .into_iter()
        .map(|(key, pos)| SeriesColumn {
            key,
            values: rows
                .iter()
                .map(|(time_index, _)| {
                    sums.get(&(*time_index, pos))
                        .map(|(sum, count)| sum / f64::from(*count))
                })
                .collect(),
        })
        .collect();

    Ok(TimeSeriesFrame {
        timestamps: rows.into_iter().map(|(_, stamp)| stamp).collect(),
        columns,
        conversions: Vec::new(),
    })
}

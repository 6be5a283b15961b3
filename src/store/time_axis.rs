//! Timestamp axis reconstructed from the `Time` table.

use super::{OutputStore, value_as_i64};
use crate::config::ExtractConfig;
use crate::constants::tables;
use crate::error::{Result, ResultsError};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Mapping from `TimeIndex` to timestamp for one interval granularity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeAxis {
    stamps: BTreeMap<i64, NaiveDateTime>,
}

impl TimeAxis {
    /// Query the time table for the configured interval.
    ///
    /// Rows that form no valid date in the configured year are skipped.
    pub fn load(store: &OutputStore, config: &ExtractConfig) -> Result<Self> {
        store.require_columns(
            tables::TIME,
            &["TimeIndex", "Month", "Day", "Hour", "Interval"],
        )?;

        let table = store.query_table(
            "SELECT TimeIndex, Month, Day, Hour FROM Time WHERE Interval = ?1 ORDER BY TimeIndex",
            &[Value::Integer(config.time_interval_minutes)],
        )?;

        let mut components = Vec::with_capacity(table.len());
        for row in &table.rows {
            let parts = (
                value_as_i64(&row[0]),
                value_as_i64(&row[1]),
                value_as_i64(&row[2]),
                value_as_i64(&row[3]),
            );
            match parts {
                (Some(index), Some(month), Some(day), Some(hour)) => {
                    if timestamp(config.axis_year, month, day, hour - 1).is_some() {
                        components.push((index, month, day, hour))
                    } else {
                        warn!(
                            "Skipping time index {}: no date {} in year {}",
                            index,
                            time_label(month, day, hour - 1),
                            config.axis_year
                        );
                    }
                }
                _ => debug!("Skipping time row with missing components: {:?}", row),
            }
        }

        Self::from_components(components, config.axis_year)
    }

    /// Build the axis from `(time_index, month, day, hour)` tuples.
    ///
    /// Hours are 1-based end-of-interval values and shift down by one.
    pub fn from_components(
        components: impl IntoIterator<Item = (i64, i64, i64, i64)>,
        year: i32,
    ) -> Result<Self> {
        let mut stamps = BTreeMap::new();

        for (time_index, month, day, hour) in components {
            let stamp = timestamp(year, month, day, hour - 1).ok_or_else(|| {
                ResultsError::InvalidTimestamp {
                    time_index,
                    reason: format!("no such date/hour {}", time_label(month, day, hour - 1)),
                }
            })?;

            if stamps.insert(time_index, stamp).is_some() {
                warn!("Time index {} appears more than once", time_index);
            }
        }

        debug!("Built time axis with {} entries", stamps.len());
        Ok(Self { stamps })
    }

    pub fn get(&self, time_index: i64) -> Option<NaiveDateTime> {
        self.stamps.get(&time_index).copied()
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}

/// Zero-padded `MM-DD-HH` label
pub fn time_label(month: i64, day: i64, hour: i64) -> String {
    format!("{:02}-{:02}-{:02}", month, day, hour)
}

fn timestamp(year: i32, month: i64, day: i64, hour: i64) -> Option<NaiveDateTime> {
    let month = u32::try_from(month).ok()?;
    let day = u32::try_from(day).ok()?;
    let hour = u32::try_from(hour).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, 0, 0)
}

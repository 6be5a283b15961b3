//! ESO series extraction.
//!
//! Streams an ESO file and collects the data lines belonging to one series.
//! Lines are matched on their leading comma-delimited token, compared as
//! text against the series index. The first matching line is the
//! dictionary declaration itself and is skipped. Reading stops at the
//! `End of Data` line; anything after it is trailing statistics.

use crate::constants::END_OF_DATA;
use crate::error::{Result, ResultsError};
use crate::models::{EsoRow, EsoSeries, SeriesDescriptor};
use std::io::BufRead;
use std::path::Path;
use tracing::debug;

/// Collect the rows of `descriptor` from a reader positioned at file start
pub fn extract_series<R: BufRead>(
    reader: R,
    descriptor: &SeriesDescriptor,
    file_path: &Path,
) -> Result<EsoSeries> {
    let period = descriptor.reporting_period()?;
    let arity = period.arity();
    let index = descriptor.index.to_string();

    let mut rows = Vec::new();
    let mut matched = 0usize;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim() == END_OF_DATA {
            break;
        }

        let mut fields = line.split(',');
        if fields.next() != Some(index.as_str()) {
            continue;
        }

        matched += 1;
        if matched == 1 {
            // dictionary echo
            continue;
        }

        let fields: Vec<&str> = fields.collect();
        if fields.len() != arity {
            return Err(ResultsError::ColumnArity {
                index,
                expected: arity,
                found: fields.len(),
            });
        }

        let values = fields
            .iter()
            .enumerate()
            .map(|(field, raw)| {
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| ResultsError::InvalidValue {
                        index: index.clone(),
                        field,
                        value: raw.to_string(),
                    })
            })
            .collect::<Result<Vec<f64>>>()?;

        rows.push(EsoRow {
            ordinal: rows.len(),
            values,
        });
    }

    if rows.is_empty() {
        return Err(ResultsError::EmptySeries {
            index,
            path: file_path.to_path_buf(),
        });
    }

    debug!(
        "Extracted series {} ({}) from {}: {} rows",
        index,
        period,
        file_path.display(),
        rows.len()
    );

    Ok(EsoSeries {
        descriptor: descriptor.clone(),
        period,
        rows,
    })
}

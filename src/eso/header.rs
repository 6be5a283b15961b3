//! ESO data dictionary parsing.
//!
//! Reads the header block of an ESO file up to the `End of Data Dictionary`
//! sentinel and turns each series declaration into a [`SeriesDescriptor`].
//! The file-level preamble (program version and the environment/time marker
//! declarations) is kept verbatim but not parsed.

use crate::constants::{END_OF_DICTIONARY, PERIOD_MARKER};
use crate::error::{Result, ResultsError};
use crate::models::SeriesDescriptor;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Parsed header block of an ESO file
#[derive(Debug, Clone)]
pub struct DataDictionary {
    /// File-level metadata lines preceding the series declarations
    pub preamble: Vec<String>,
    /// One descriptor per declared series, in file order
    pub descriptors: Vec<SeriesDescriptor>,
    /// Number of lines up to and including the sentinel
    pub dictionary_lines: usize,
}

/// Open `file_path` and parse its data dictionary
pub fn read_dictionary(file_path: &Path, preamble_lines: usize) -> Result<DataDictionary> {
    let file = File::open(file_path)?;
    parse_dictionary(BufReader::new(file), file_path, preamble_lines)
}

/// Parse the data dictionary from a reader positioned at the start of the file
pub fn parse_dictionary<R: BufRead>(
    reader: R,
    file_path: &Path,
    preamble_lines: usize,
) -> Result<DataDictionary> {
    let mut preamble = Vec::new();
    let mut descriptors = Vec::new();
    let mut dictionary_lines = None;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;

        if line.contains(END_OF_DICTIONARY) {
            dictionary_lines = Some(line_num + 1);
            break;
        }

        if line_num < preamble_lines {
            preamble.push(line);
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        descriptors.push(parse_header_line(&line, file_path, line_num + 1)?);
    }

    let dictionary_lines = dictionary_lines.ok_or_else(|| ResultsError::MissingDictionaryEnd {
        path: file_path.to_path_buf(),
    })?;

    debug!(
        "Parsed data dictionary of {}: {} series, {} lines",
        file_path.display(),
        descriptors.len(),
        dictionary_lines
    );

    Ok(DataDictionary {
        preamble,
        descriptors,
        dictionary_lines,
    })
}

/// Parse one declaration of the form `idx,type,key[,name] !period [...]`
pub fn parse_header_line(line: &str, file_path: &Path, line_num: usize) -> Result<SeriesDescriptor> {
    let invalid = |reason: String| ResultsError::InvalidHeader {
        path: file_path.to_path_buf(),
        line: line_num,
        reason,
    };

    let line = line.trim_end_matches(['\r', '\n']);
    let (left, right) = line
        .split_once(PERIOD_MARKER)
        .ok_or_else(|| invalid(format!("missing '{}' separator", PERIOD_MARKER)))?;

    // The period is the token up to the first space; anything after the next
    // marker is commentary.
    let right = right.split(PERIOD_MARKER).next().unwrap_or_default();
    let period_label = right.split(' ').next().unwrap_or_default().to_string();

    let fields: Vec<&str> = left.split(',').collect();
    if fields.len() < 3 {
        return Err(invalid(format!(
            "expected at least 3 fields before '{}', found {}",
            PERIOD_MARKER,
            fields.len()
        )));
    }

    let index = fields[0]
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid(format!("series index '{}' is not an integer", fields[0])))?;

    let key_value = fields[2].trim().to_string();
    let name = fields.get(3).map(|s| s.trim().to_string()).unwrap_or_default();

    Ok(SeriesDescriptor {
        index,
        period_label,
        key_value,
        name,
        period_type: fields[1].trim().to_string(),
    })
}

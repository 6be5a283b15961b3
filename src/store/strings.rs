//! String-pool resolution for the tabular report tables.
//!
//! `TabularData` stores every label as an integer id into the `Strings`
//! table. [`StringDictionary`] loads that table into memory and swaps each
//! `...Index` column of a query result for the string it points at.

use super::{OutputStore, RawTable, value_as_i64, value_as_string};
use crate::constants::{INDEX_MARKER, NON_STRING_INDEX_COLUMNS, TABULAR_PRIMARY_KEY, tables};
use crate::error::{Result, ResultsError};
use crate::models::StringType;
use rusqlite::types::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// One entry of the string pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringEntry {
    /// `None` for type tags outside the documented range
    pub string_type: Option<StringType>,
    pub value: String,
}

/// In-memory copy of the `Strings` table, keyed by string id
#[derive(Debug, Clone, Default)]
pub struct StringDictionary {
    entries: HashMap<i64, StringEntry>,
}

impl StringDictionary {
    /// Load the full `Strings` table
    pub fn load(store: &OutputStore) -> Result<Self> {
        store.require_columns(
            tables::STRINGS,
            &["StringIndex", "StringTypeIndex", "Value"],
        )?;

        let table = store.query_table(
            "SELECT StringIndex, StringTypeIndex, Value FROM Strings",
            &[],
        )?;

        let mut entries = HashMap::with_capacity(table.len());
        for row in &table.rows {
            let Some(id) = value_as_i64(&row[0]) else {
                warn!("Skipping string entry with non-integer id: {:?}", row[0]);
                continue;
            };
            let string_type = value_as_i64(&row[1]).and_then(StringType::from_index);
            entries.insert(
                id,
                StringEntry {
                    string_type,
                    value: value_as_string(&row[2]),
                },
            );
        }

        debug!("Loaded {} strings", entries.len());
        Ok(Self { entries })
    }

    /// Build a dictionary from `(id, entry)` pairs
    pub fn from_entries(entries: impl IntoIterator<Item = (i64, StringEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&StringEntry> {
        self.entries.get(&id)
    }

    /// Resolve an id, failing rather than handing back the bare integer
    pub fn resolve(&self, id: i64) -> Result<&str> {
        self.entries
            .get(&id)
            .map(|entry| entry.value.as_str())
            .ok_or(ResultsError::UnresolvedString { id })
    }

    /// Replace every string-id column with its resolved values.
    ///
    /// A column `FooIndex` becomes `Foo`. The table's primary key is kept
    /// as is; index columns referencing other tables are dropped.
    pub fn resolve_index_columns(&self, table: RawTable) -> Result<RawTable> {
        enum Action {
            Keep,
            Resolve,
            Drop,
        }

        let actions: Vec<Action> = table
            .columns
            .iter()
            .map(|column| {
                if !column.contains(INDEX_MARKER) || column == TABULAR_PRIMARY_KEY {
                    Action::Keep
                } else if NON_STRING_INDEX_COLUMNS.contains(&column.as_str()) {
                    Action::Drop
                } else {
                    Action::Resolve
                }
            })
            .collect();

        let columns = table
            .columns
            .iter()
            .zip(&actions)
            .filter_map(|(column, action)| match action {
                Action::Keep => Some(column.clone()),
                Action::Resolve => Some(column.replace(INDEX_MARKER, "")),
                Action::Drop => None,
            })
            .collect();

        let mut rows = Vec::with_capacity(table.rows.len());
        for row in table.rows {
            let mut resolved = Vec::with_capacity(row.len());
            for (value, action) in row.into_iter().zip(&actions) {
                match action {
                    Action::Keep => resolved.push(value),
                    Action::Drop => {}
                    Action::Resolve => resolved.push(self.resolve_value(&value)?),
                }
            }
            rows.push(resolved);
        }

        Ok(RawTable { columns, rows })
    }

    // NULL and non-numeric cells carry no id and pass through untouched.
    fn resolve_value(&self, value: &Value) -> Result<Value> {
        match value_as_i64(value) {
            Some(id) => Ok(Value::Text(self.resolve(id)?.to_string())),
            None => Ok(value.clone()),
        }
    }
}

/// Find the id of `value` among strings of `string_type` by exact match.
///
/// Fails when the value is absent or stored under more than one id.
pub fn lookup_string_id(store: &OutputStore, string_type: StringType, value: &str) -> Result<i64> {
    let table = store.query_table(
        "SELECT StringIndex FROM Strings WHERE StringTypeIndex = ?1 AND Value = ?2",
        &[
            Value::Integer(string_type.index()),
            Value::Text(value.to_string()),
        ],
    )?;

    match table.rows.as_slice() {
        [] => Err(ResultsError::StringNotFound {
            string_type: string_type.to_string(),
            value: value.to_string(),
        }),
        [row] => value_as_i64(&row[0]).ok_or_else(|| ResultsError::StringNotFound {
            string_type: string_type.to_string(),
            value: value.to_string(),
        }),
        rows => Err(ResultsError::AmbiguousString {
            string_type: string_type.to_string(),
            value: value.to_string(),
            count: rows.len(),
        }),
    }
}

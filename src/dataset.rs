//! In-memory tabular dataset.
//!
//! A [`Dataset`] is an ordered list of uniquely named columns plus an ordered
//! list of rows. Rows are stored positionally, one value per column, so every
//! record always carries exactly the dataset's column set.
//!
//! # Example
//!
//! ```no_run
//! use tabmerge::dataset::{ColumnMapping, Dataset};
//! use tabmerge::format::Format;
//!
//! let company_a = Dataset::load("data_raw/dados_empresaA.json", Format::Json)?;
//! let mut company_b = Dataset::load("data_raw/dados_empresaB.csv", Format::Csv)?;
//!
//! let mut mapping = ColumnMapping::new();
//! mapping.insert("Nome da Loja".to_owned(), "Filial".to_owned());
//! company_b.rename_columns(&mapping)?;
//!
//! let merged = company_a.join(&company_b)?;
//! merged.save("data_processed/dados_combinados.csv")?;
//! # Ok::<(), tabmerge::error::TabmergeError>(())
//! ```

mod join;

pub use join::{DEFAULT_FILL, JoinOptions, RowCountPolicy, join};

use crate::error::{Result, TabmergeError};
use crate::format::{self, Format};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Cell value. CSV cells are always strings; JSON cells keep their type.
pub type Value = serde_json::Value;

/// Rename table: existing column name to new column name.
pub type ColumnMapping = BTreeMap<String, String>;

/// Table of rows sharing one ordered, duplicate-free set of columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Build a dataset from column names and positional rows.
    ///
    /// # Errors
    ///
    /// Returns [`TabmergeError::DuplicateColumn`] if a name repeats, and
    /// [`TabmergeError::Parse`] if a row's width differs from the column count
    /// or if there are rows but no columns.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        if let Some(dup) = first_duplicate(&columns) {
            return Err(TabmergeError::DuplicateColumn(dup.to_owned()));
        }
        // A row without cells cannot be written to CSV.
        if columns.is_empty() && !rows.is_empty() {
            return Err(TabmergeError::Parse(format!(
                "{} rows but no columns",
                rows.len()
            )));
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TabmergeError::Parse(format!(
                    "row {idx} has {} fields, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Build a dataset from key/value records.
    ///
    /// Column order is the key order of the first record. Every other record
    /// must have exactly the same key set, in any order.
    ///
    /// # Errors
    ///
    /// Returns [`TabmergeError::Parse`] when a record's keys differ from the
    /// first record's, or when the records have no keys at all.
    pub fn from_records(records: Vec<serde_json::Map<String, Value>>) -> Result<Self> {
        let Some(first) = records.first() else {
            return Ok(Self::default());
        };
        let columns: Vec<String> = first.keys().cloned().collect();

        let mut rows = Vec::with_capacity(records.len());
        for (idx, mut record) in records.into_iter().enumerate() {
            if record.len() != columns.len() {
                return Err(mismatched_record(idx, &record, &columns));
            }
            let mut row = Vec::with_capacity(columns.len());
            for name in &columns {
                match record.remove(name) {
                    Some(value) => row.push(value),
                    None => return Err(mismatched_record(idx, &record, &columns)),
                }
            }
            rows.push(row);
        }

        Self::new(columns, rows)
    }

    /// Load a dataset from `path`, decoding it as `format`.
    ///
    /// # Errors
    ///
    /// [`TabmergeError::FileNotFound`] if the path does not exist,
    /// [`TabmergeError::Parse`] if the content is not valid for `format`,
    /// [`TabmergeError::Io`] on any other read failure.
    pub fn load(path: impl AsRef<Path>, format: Format) -> Result<Self> {
        format::read_path(path.as_ref(), format)
    }

    /// Load a dataset, picking the format from the file extension.
    ///
    /// # Errors
    ///
    /// Same as [`Dataset::load`], plus [`TabmergeError::UnsupportedFormat`]
    /// for an unrecognized extension.
    pub fn load_inferred(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::load(path, Format::from_path(path)?)
    }

    /// Write the dataset to `path` as CSV, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`TabmergeError::Io`] if the file cannot be created or written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        format::write_path(self, path.as_ref())
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` in [`Dataset::column_names`].
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        self.rows.get(index).map(|values| Record {
            columns: &self.columns,
            values,
        })
    }

    pub fn records(&self) -> impl ExactSizeIterator<Item = Record<'_>> + '_ {
        self.rows.iter().map(|values| Record {
            columns: &self.columns,
            values,
        })
    }

    /// Rename columns in place.
    ///
    /// Columns missing from `mapping` keep their name; identity entries are
    /// allowed. The whole mapping is checked before anything changes, so a
    /// failed rename leaves the dataset untouched.
    ///
    /// # Errors
    ///
    /// [`TabmergeError::UnknownColumn`] if a mapping key is not a column,
    /// [`TabmergeError::DuplicateColumn`] if the renamed columns would collide.
    pub fn rename_columns(&mut self, mapping: &ColumnMapping) -> Result<()> {
        if let Some(missing) = mapping.keys().find(|k| self.column_index(k).is_none()) {
            return Err(TabmergeError::UnknownColumn(missing.clone()));
        }

        let renamed: Vec<String> = self
            .columns
            .iter()
            .map(|name| mapping.get(name).unwrap_or(name).clone())
            .collect();

        if let Some(dup) = first_duplicate(&renamed) {
            return Err(TabmergeError::DuplicateColumn(dup.to_owned()));
        }

        log::debug!("Renamed columns {:?} -> {:?}", self.columns, renamed);
        self.columns = renamed;
        Ok(())
    }
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    /// Values in column order.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn to_map(&self) -> serde_json::Map<String, Value> {
        self.iter()
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .collect()
    }
}

/// Text form of a cell as written to CSV.
///
/// Strings are verbatim, `null` is empty, everything else is compact JSON.
pub fn cell_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .map(String::as_str)
}

fn mismatched_record(
    idx: usize,
    record: &serde_json::Map<String, Value>,
    columns: &[String],
) -> TabmergeError {
    let keys: Vec<&String> = record.keys().collect();
    TabmergeError::Parse(format!(
        "record {idx} has keys {keys:?}, expected {columns:?}"
    ))
}

//! Combining two datasets into one.
//!
//! Three shapes are supported:
//! - [`Dataset::join`] / [`Dataset::join_with`]: positional, row *i* with row *i*.
//!   Only meaningful when both inputs list the same entities in the same order.
//! - [`Dataset::join_on`]: inner join on a shared key column.
//! - [`Dataset::concat`]: rows of one dataset below the other's.
//!
//! All three produce the same column layout: the left columns in order,
//! then the right columns the left does not already have.

use super::{Dataset, Value, cell_text};
use crate::error::{Result, TabmergeError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Placeholder for cells a side of [`Dataset::concat`] has no column for.
pub const DEFAULT_FILL: &str = "Indisponivel";

/// What a positional join does when the row counts differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowCountPolicy {
    /// Fail with [`TabmergeError::RowCountMismatch`].
    #[default]
    Strict,
    /// Keep only the first `min(left, right)` rows.
    Truncate,
}

impl RowCountPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Truncate => "truncate",
        }
    }
}

impl fmt::Display for RowCountPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowCountPolicy {
    type Err = TabmergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "truncate" => Ok(Self::Truncate),
            other => Err(TabmergeError::Config(format!(
                "Unknown row count policy '{other}', expected 'strict' or 'truncate'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinOptions {
    pub row_policy: RowCountPolicy,
    /// Compare the columns both sides share by text form and fail on the
    /// first difference.
    /// When off, the left value is kept without looking at the right one.
    pub verify_overlap: bool,
}

/// Positional join with the default [`JoinOptions`].
///
/// # Errors
///
/// See [`Dataset::join_with`].
pub fn join(left: &Dataset, right: &Dataset) -> Result<Dataset> {
    left.join_with(right, JoinOptions::default())
}

/// Column layout shared by every combine operation.
struct ColumnUnion<'a> {
    columns: Vec<String>,
    /// Positions in the right dataset of columns the left lacks.
    right_only: Vec<usize>,
    /// Shared columns as (name, left position, right position).
    shared: Vec<(&'a str, usize, usize)>,
}

impl<'a> ColumnUnion<'a> {
    fn of(left: &'a Dataset, right: &'a Dataset) -> Self {
        let mut columns = left.columns.clone();
        let mut right_only = Vec::new();
        let mut shared = Vec::new();

        for (ri, name) in right.columns.iter().enumerate() {
            match left.column_index(name) {
                Some(li) => shared.push((name.as_str(), li, ri)),
                None => {
                    columns.push(name.clone());
                    right_only.push(ri);
                }
            }
        }

        Self {
            columns,
            right_only,
            shared,
        }
    }

    fn extend_row(&self, left: &[Value], right: &[Value]) -> Vec<Value> {
        let mut row = Vec::with_capacity(self.columns.len());
        row.extend_from_slice(left);
        row.extend(
            self.right_only
                .iter()
                .map(|&ri| right.get(ri).cloned().unwrap_or(Value::Null)),
        );
        row
    }
}

impl Dataset {
    /// Positional join with the default options (strict row count).
    ///
    /// # Errors
    ///
    /// See [`Dataset::join_with`].
    pub fn join(&self, right: &Self) -> Result<Self> {
        join(self, right)
    }

    /// Positional join: row *i* of the result is row *i* of `self` followed by
    /// row *i* of `right` restricted to the columns `self` does not have.
    ///
    /// # Errors
    ///
    /// [`TabmergeError::RowCountMismatch`] under [`RowCountPolicy::Strict`]
    /// when the row counts differ, [`TabmergeError::ColumnConflict`] when
    /// `verify_overlap` is set and a shared column disagrees.
    pub fn join_with(&self, right: &Self, options: JoinOptions) -> Result<Self> {
        let (left_rows, right_rows) = (self.row_count(), right.row_count());
        if left_rows != right_rows {
            match options.row_policy {
                RowCountPolicy::Strict => {
                    return Err(TabmergeError::RowCountMismatch {
                        left: left_rows,
                        right: right_rows,
                    });
                }
                RowCountPolicy::Truncate => log::warn!(
                    "Row counts differ ({left_rows} vs {right_rows}), keeping the first {} rows",
                    left_rows.min(right_rows)
                ),
            }
        }

        let union = ColumnUnion::of(self, right);
        let mut rows = Vec::with_capacity(left_rows.min(right_rows));

        for (idx, (l, r)) in self.rows.iter().zip(&right.rows).enumerate() {
            if options.verify_overlap {
                for &(name, li, ri) in &union.shared {
                    let same = match (l.get(li), r.get(ri)) {
                        (Some(a), Some(b)) => cell_text(a) == cell_text(b),
                        (a, b) => a == b,
                    };
                    if !same {
                        return Err(TabmergeError::ColumnConflict {
                            column: name.to_owned(),
                            row: idx,
                        });
                    }
                }
            }
            rows.push(union.extend_row(l, r));
        }

        Ok(Self {
            columns: union.columns,
            rows,
        })
    }

    /// Inner join on `key`, a column both datasets have.
    ///
    /// Key cells are compared by their text form, so `"7"` in a CSV matches
    /// `7` in JSON. Result rows follow the order of `self`; rows of `self`
    /// with no partner in `right` are dropped.
    ///
    /// # Errors
    ///
    /// [`TabmergeError::UnknownColumn`] if either side lacks `key`,
    /// [`TabmergeError::DuplicateKey`] if a key value repeats in `right`.
    pub fn join_on(&self, right: &Self, key: &str) -> Result<Self> {
        let missing = || TabmergeError::UnknownColumn(key.to_owned());
        let lk = self.column_index(key).ok_or_else(missing)?;
        let rk = right.column_index(key).ok_or_else(missing)?;

        let mut index: HashMap<String, usize> = HashMap::with_capacity(right.row_count());
        for (ri, row) in right.rows.iter().enumerate() {
            let value = row.get(rk).map(|v| cell_text(v).into_owned()).unwrap_or_default();
            if index.contains_key(&value) {
                return Err(TabmergeError::DuplicateKey {
                    column: key.to_owned(),
                    value,
                });
            }
            index.insert(value, ri);
        }

        let union = ColumnUnion::of(self, right);
        let rows: Vec<Vec<Value>> = self
            .rows
            .iter()
            .filter_map(|l| {
                let value = l.get(lk).map(cell_text)?;
                let r = right.rows.get(*index.get(&*value)?)?;
                Some(union.extend_row(l, r))
            })
            .collect();

        log::debug!(
            "Key join on '{key}': {} of {} left rows matched",
            rows.len(),
            self.row_count()
        );

        Ok(Self {
            columns: union.columns,
            rows,
        })
    }

    /// Stack the rows of `bottom` below the rows of `self`.
    ///
    /// Cells for columns a side does not have are set to `fill`.
    pub fn concat(&self, bottom: &Self, fill: &str) -> Self {
        let union = ColumnUnion::of(self, bottom);
        let fill = Value::String(fill.to_owned());

        let mut rows = Vec::with_capacity(self.row_count() + bottom.row_count());
        for l in &self.rows {
            let mut row = l.clone();
            row.resize(union.columns.len(), fill.clone());
            rows.push(row);
        }

        let positions: Vec<Option<usize>> = union
            .columns
            .iter()
            .map(|name| bottom.column_index(name))
            .collect();
        for b in &bottom.rows {
            rows.push(
                positions
                    .iter()
                    .map(|pos| pos.and_then(|p| b.get(p)).cloned().unwrap_or_else(|| fill.clone()))
                    .collect(),
            );
        }

        Self {
            columns: union.columns,
            rows,
        }
    }
}

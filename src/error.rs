//! Error types for tabmerge.
//!
//! Every fallible operation in the library returns [`Result`], whose error
//! side is [`TabmergeError`]. The variants map one-to-one onto the failure
//! kinds a merge run can hit, so callers can match on them:
//!
//! ```
//! use tabmerge::error::TabmergeError;
//!
//! fn describe(err: &TabmergeError) -> &'static str {
//!     match err {
//!         TabmergeError::FileNotFound(_) => "missing input",
//!         TabmergeError::UnknownColumn(_) | TabmergeError::DuplicateColumn(_) => "bad rename",
//!         TabmergeError::RowCountMismatch { .. } => "inputs do not line up",
//!         _ => "other",
//!     }
//! }
//! ```
//!
//! `From` conversions exist for the I/O, CSV and JSON errors so the `?`
//! operator works inside readers and writers.

use std::fmt;
use std::path::PathBuf;

/// Main error type for tabmerge operations.
#[derive(Debug)]
pub enum TabmergeError {
    /// Input path does not exist.
    FileNotFound(PathBuf),

    /// Format tag or file extension outside the supported set.
    UnsupportedFormat(String),

    /// File content could not be decoded per its declared format.
    Parse(String),

    /// A column referenced by name is not part of the dataset.
    UnknownColumn(String),

    /// An operation would leave two columns with the same name.
    DuplicateColumn(String),

    /// A key column holds the same value on more than one row.
    DuplicateKey { column: String, value: String },

    /// Positional join of datasets with different row counts.
    RowCountMismatch { left: usize, right: usize },

    /// Overlapping column holds different values on the two sides of a join.
    ColumnConflict { column: String, row: usize },

    /// I/O errors (open, read, write)
    Io(std::io::Error),

    /// Merge spec errors
    Config(String),
}

impl fmt::Display for TabmergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            Self::UnsupportedFormat(tag) => write!(f, "Unsupported format: {tag}"),
            Self::Parse(msg) => write!(f, "Parse error: {msg}"),
            Self::UnknownColumn(name) => write!(f, "Unknown column: '{name}'"),
            Self::DuplicateColumn(name) => write!(f, "Duplicate column: '{name}'"),
            Self::DuplicateKey { column, value } => {
                write!(f, "Duplicate key '{value}' in column '{column}'")
            }
            Self::RowCountMismatch { left, right } => write!(
                f,
                "Row count mismatch: left has {left} rows, right has {right} rows"
            ),
            Self::ColumnConflict { column, row } => {
                write!(f, "Conflicting values in column '{column}' at row {row}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for TabmergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TabmergeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for TabmergeError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(e) => Self::Io(e),
                other => Self::Parse(format!("{other:?}")),
            }
        } else {
            Self::Parse(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TabmergeError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(err.into())
        } else {
            Self::Parse(format!("JSON error: {err}"))
        }
    }
}

/// Result type alias for tabmerge operations.
pub type Result<T> = std::result::Result<T, TabmergeError>;

/// Extension trait to add context to results.
///
/// The variant of the underlying error is kept; only its message grows a
/// prefix, so callers matching on the kind still see the original failure.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TabmergeError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let msg = msg.into();
            let err: TabmergeError = e.into();
            match err {
                TabmergeError::Parse(inner) => TabmergeError::Parse(format!("{msg}: {inner}")),
                TabmergeError::Config(inner) => TabmergeError::Config(format!("{msg}: {inner}")),
                TabmergeError::Io(inner) => TabmergeError::Io(std::io::Error::new(
                    inner.kind(),
                    format!("{msg}: {inner}"),
                )),
                other => other,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TabmergeError::UnknownColumn("Nome do Item".to_owned());
        assert_eq!(err.to_string(), "Unknown column: 'Nome do Item'");

        let err = TabmergeError::RowCountMismatch { left: 5, right: 3 };
        assert_eq!(
            err.to_string(),
            "Row count mismatch: left has 5 rows, right has 3 rows"
        );
    }

    #[test]
    fn test_json_syntax_error_is_parse() {
        let err = serde_json::from_str::<serde_json::Value>("[1, 2").unwrap_err();
        assert!(matches!(TabmergeError::from(err), TabmergeError::Parse(_)));
    }

    #[test]
    fn test_result_context_keeps_kind() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "out.csv",
        ));

        let err = result.context("Failed to write output").unwrap_err();
        match err {
            TabmergeError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied);
                assert!(e.to_string().contains("Failed to write output"));
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }
}

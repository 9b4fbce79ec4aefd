//! Supported file formats and the readers/writer behind them.
//!
//! Each [`Format`] variant has exactly one [`FormatReader`] implementation.
//! Adding a format means adding a variant, a reader, and an arm in
//! [`Format::reader`].

mod delimited;
mod records;

pub use delimited::{DelimitedReader, write_delimited};
pub use records::RecordReader;

use crate::dataset::Dataset;
use crate::error::{Result, ResultExt as _, TabmergeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write as _};
use std::path::Path;
use std::str::FromStr;

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Array of key/value records.
    Json,
    /// Comma-delimited text with a header row.
    Csv,
}

impl Format {
    pub const ALL: [Self; 2] = [Self::Json, Self::Csv];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Infer the format from the file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`TabmergeError::UnsupportedFormat`] for a missing or unknown
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        ext.parse().map_err(|_| {
            TabmergeError::UnsupportedFormat(format!(
                "cannot infer format from extension '{ext}' of {}",
                path.display()
            ))
        })
    }

    pub fn reader(self) -> &'static dyn FormatReader {
        match self {
            Self::Json => &RecordReader,
            Self::Csv => &DelimitedReader,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = TabmergeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TabmergeError::UnsupportedFormat(s.to_owned()))
    }
}

/// Decodes a byte stream into a [`Dataset`].
pub trait FormatReader {
    /// Read the whole stream.
    ///
    /// # Errors
    ///
    /// Returns [`TabmergeError::Parse`] when the content does not decode.
    fn read(&self, source: &mut dyn Read) -> Result<Dataset>;
}

pub(crate) fn read_path(path: &Path, format: Format) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TabmergeError::FileNotFound(path.to_path_buf()),
        _ => TabmergeError::Io(e),
    })?;
    let mut reader = BufReader::new(file);

    let dataset = format
        .reader()
        .read(&mut reader)
        .context(format!("Failed to read {format} from {}", path.display()))?;

    log::debug!(
        "Loaded {} rows x {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        path.display()
    );
    Ok(dataset)
}

pub(crate) fn write_path(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = File::create(path).context(format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_delimited(dataset, &mut writer)?;
    writer
        .flush()
        .context(format!("Failed to write {}", path.display()))?;

    log::debug!(
        "Wrote {} rows x {} columns to {}",
        dataset.row_count(),
        dataset.column_count(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_tags() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("CSV".parse::<Format>().unwrap(), Format::Csv);

        let err = "parquet".parse::<Format>().unwrap_err();
        assert!(matches!(err, TabmergeError::UnsupportedFormat(tag) if tag == "parquet"));
    }

    #[test]
    fn test_from_path() {
        let json = PathBuf::from("data_raw/dados_empresaA.JSON");
        assert_eq!(Format::from_path(&json).unwrap(), Format::Json);

        let csv = PathBuf::from("data_raw/dados_empresaB.csv");
        assert_eq!(Format::from_path(&csv).unwrap(), Format::Csv);

        for bad in ["dados.xlsx", "dados"] {
            let err = Format::from_path(Path::new(bad)).unwrap_err();
            assert!(matches!(err, TabmergeError::UnsupportedFormat(_)), "{bad}");
        }
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for format in Format::ALL {
            assert_eq!(format.to_string().parse::<Format>().unwrap(), format);
        }
    }

    #[test]
    fn test_missing_file() {
        let err = read_path(Path::new("does/not/exist.csv"), Format::Csv).unwrap_err();
        assert!(matches!(err, TabmergeError::FileNotFound(_)));
    }
}

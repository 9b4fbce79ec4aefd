//! Merge spec: which files to read, how to rename, how to combine, where to write.
//!
//! Specs are plain JSON so a merge can be re-run without recompiling:
//!
//! ```json
//! {
//!   "version": "0.1",
//!   "left": { "path": "data_raw/dados_empresaA.json", "format": "json" },
//!   "right": {
//!     "path": "data_raw/dados_empresaB.csv",
//!     "rename": { "Nome da Loja": "Filial" }
//!   },
//!   "combine": { "mode": "zip", "row_policy": "strict" },
//!   "output": "data_processed/dados_combinados.csv"
//! }
//! ```
//!
//! [`MergeSpec::default`] is the Company A / Company B merge.

use crate::dataset::{ColumnMapping, DEFAULT_FILL, RowCountPolicy};
use crate::error::{Result, TabmergeError};
use crate::format::Format;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current merge spec version
pub const SPEC_VERSION: &str = "0.1";

pub const DEFAULT_LEFT_PATH: &str = "data_raw/dados_empresaA.json";
pub const DEFAULT_RIGHT_PATH: &str = "data_raw/dados_empresaB.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "data_processed/dados_combinados.csv";

/// Company B column names mapped onto Company A's naming scheme.
pub const DEFAULT_RENAME: [(&str, &str); 6] = [
    ("Nome do Item", "Nome do Produto"),
    ("Classificação do Produto", "Categoria do Produto"),
    ("Valor em Reais (R$)", "Preço do Produto (R$)"),
    ("Quantidade em Estoque", "Quantidade em Estoque"),
    ("Nome da Loja", "Filial"),
    ("Data da Venda", "Data da Venda"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeSpec {
    /// Spec version for future migrations
    pub version: String,

    /// Dataset whose columns come first in the output
    pub left: InputSpec,

    pub right: InputSpec,

    #[serde(default)]
    pub combine: CombineMode,

    /// Destination CSV file
    pub output: PathBuf,
}

impl MergeSpec {
    pub fn new(left: InputSpec, right: InputSpec, output: impl Into<PathBuf>) -> Self {
        Self {
            version: SPEC_VERSION.to_owned(),
            left,
            right,
            combine: CombineMode::default(),
            output: output.into(),
        }
    }

    /// Load a merge spec from a JSON file
    ///
    /// # Errors
    ///
    /// [`TabmergeError::FileNotFound`] if the file is missing,
    /// [`TabmergeError::Config`] if it does not parse or validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TabmergeError::FileNotFound(path.to_path_buf()),
            _ => TabmergeError::Io(e),
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a merge spec from a JSON string
    ///
    /// # Errors
    ///
    /// Returns [`TabmergeError::Config`] on malformed JSON or a failed check
    /// in [`MergeSpec::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: Self = serde_json::from_str(json)
            .map_err(|e| TabmergeError::Config(format!("Failed to parse merge spec: {e}")))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Save merge spec to a JSON file
    ///
    /// # Errors
    ///
    /// Returns [`TabmergeError::Io`] if the file cannot be written.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Serialize merge spec to a pretty JSON string
    ///
    /// # Errors
    ///
    /// Returns [`TabmergeError::Config`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TabmergeError::Config(format!("Failed to serialize merge spec: {e}")))
    }

    /// Check the parts serde cannot: version, resolvable formats, key name.
    ///
    /// # Errors
    ///
    /// Returns [`TabmergeError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.version != SPEC_VERSION {
            return Err(TabmergeError::Config(format!(
                "Unsupported spec version '{}', expected '{SPEC_VERSION}'",
                self.version
            )));
        }

        for (side, input) in [("left", &self.left), ("right", &self.right)] {
            input
                .resolved_format()
                .map_err(|e| TabmergeError::Config(format!("{side} input: {e}")))?;
        }

        if let CombineMode::Key { key } = &self.combine
            && key.trim().is_empty()
        {
            return Err(TabmergeError::Config(
                "Key join requires a non-empty 'key'".to_owned(),
            ));
        }

        Ok(())
    }
}

impl Default for MergeSpec {
    fn default() -> Self {
        let rename = DEFAULT_RENAME
            .iter()
            .map(|(from, to)| ((*from).to_owned(), (*to).to_owned()))
            .collect();

        Self::new(
            InputSpec::new(DEFAULT_LEFT_PATH).with_format(Format::Json),
            InputSpec::new(DEFAULT_RIGHT_PATH)
                .with_format(Format::Csv)
                .with_rename(rename),
            DEFAULT_OUTPUT_PATH,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub path: PathBuf,

    /// Inferred from the extension when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,

    /// Columns to rename right after loading
    #[serde(default, skip_serializing_if = "ColumnMapping::is_empty")]
    pub rename: ColumnMapping,
}

impl InputSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            rename: ColumnMapping::new(),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    #[must_use]
    pub fn with_rename(mut self, rename: ColumnMapping) -> Self {
        self.rename = rename;
        self
    }

    /// Declared format, or the one implied by the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`TabmergeError::UnsupportedFormat`] if neither is available.
    pub fn resolved_format(&self) -> Result<Format> {
        match self.format {
            Some(format) => Ok(format),
            None => Format::from_path(&self.path),
        }
    }
}

/// How the two inputs become one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CombineMode {
    /// Positional join, row *i* with row *i*.
    Zip {
        #[serde(default)]
        row_policy: RowCountPolicy,
        #[serde(default)]
        verify_overlap: bool,
    },
    /// Right rows below left rows, gaps filled with `fill`.
    Stack {
        #[serde(default = "default_fill")]
        fill: String,
    },
    /// Inner join on a shared column.
    Key { key: String },
}

impl Default for CombineMode {
    fn default() -> Self {
        Self::Zip {
            row_policy: RowCountPolicy::default(),
            verify_overlap: false,
        }
    }
}

fn default_fill() -> String {
    DEFAULT_FILL.to_owned()
}

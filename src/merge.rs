//! The merge job: load both inputs, rename, combine, save.
//!
//! ```no_run
//! use tabmerge::config::MergeSpec;
//! use tabmerge::merge::run_merge;
//!
//! let report = run_merge(&MergeSpec::default())?;
//! println!("{}", report.summary());
//! # Ok::<(), tabmerge::error::TabmergeError>(())
//! ```

use crate::config::{CombineMode, InputSpec, MergeSpec};
use crate::dataset::{Dataset, JoinOptions};
use crate::error::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What a merge run saw and produced.
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub left_columns: Vec<String>,
    pub left_rows: usize,

    /// Right columns as loaded, before renaming
    pub right_columns: Vec<String>,
    pub right_rows: usize,

    /// Right columns after renaming
    pub renamed_columns: Vec<String>,

    pub merged_columns: Vec<String>,
    pub merged_rows: usize,

    pub output: PathBuf,

    pub duration: Duration,
}

impl MergeReport {
    pub fn summary(&self) -> String {
        format!(
            "Merged {} + {} rows into {} rows x {} columns at {} in {:.2}s",
            self.left_rows,
            self.right_rows,
            self.merged_rows,
            self.merged_columns.len(),
            self.output.display(),
            self.duration.as_secs_f64()
        )
    }
}

/// Run the merge described by `spec`.
///
/// # Errors
///
/// Any failure while loading, renaming, combining, or saving aborts the run
/// and is returned unchanged.
pub fn run_merge(spec: &MergeSpec) -> Result<MergeReport> {
    let start = Instant::now();
    spec.validate()?;

    let mut left = load_input("left", &spec.left)?;
    let left_columns = left.column_names().to_vec();

    let mut right = load_input("right", &spec.right)?;
    let right_columns = right.column_names().to_vec();

    rename_input("left", &mut left, &spec.left)?;
    rename_input("right", &mut right, &spec.right)?;
    let renamed_columns = right.column_names().to_vec();

    let merged = combine(&left, &right, &spec.combine)?;
    log::info!("Merged columns: {:?}", merged.column_names());
    log::info!("Merged rows: {}", merged.row_count());

    if let Some(parent) = spec.output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    merged.save(&spec.output)?;
    log::info!("Merged data saved to {}", spec.output.display());

    Ok(MergeReport {
        left_columns,
        left_rows: left.row_count(),
        right_columns,
        right_rows: right.row_count(),
        renamed_columns,
        merged_columns: merged.column_names().to_vec(),
        merged_rows: merged.row_count(),
        output: spec.output.clone(),
        duration: start.elapsed(),
    })
}

/// Combine two datasets per `mode`.
///
/// # Errors
///
/// Whatever the selected join reports; stacking cannot fail.
pub fn combine(left: &Dataset, right: &Dataset, mode: &CombineMode) -> Result<Dataset> {
    match mode {
        CombineMode::Zip {
            row_policy,
            verify_overlap,
        } => left.join_with(
            right,
            JoinOptions {
                row_policy: *row_policy,
                verify_overlap: *verify_overlap,
            },
        ),
        CombineMode::Stack { fill } => Ok(left.concat(right, fill)),
        CombineMode::Key { key } => left.join_on(right, key),
    }
}

fn load_input(side: &str, input: &InputSpec) -> Result<Dataset> {
    let format = input.resolved_format()?;
    let dataset = Dataset::load(&input.path, format)?;
    log::info!(
        "Loaded {side} input {} ({format}): columns {:?}",
        input.path.display(),
        dataset.column_names()
    );
    log::info!("Rows in {side} input: {}", dataset.row_count());
    Ok(dataset)
}

fn rename_input(side: &str, dataset: &mut Dataset, input: &InputSpec) -> Result<()> {
    if input.rename.is_empty() {
        return Ok(());
    }
    dataset.rename_columns(&input.rename)?;
    log::info!(
        "Columns of {side} input after renaming: {:?}",
        dataset.column_names()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RowCountPolicy;
    use crate::error::TabmergeError;
    use crate::format::Format;
    use std::collections::BTreeMap;

    fn write(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn spec(dir: &std::path::Path, right_csv: &str) -> MergeSpec {
        let left = write(
            dir,
            "empresaA.json",
            r#"[
                {"Nome do Produto": "Caneta", "Filial": "Centro"},
                {"Nome do Produto": "Caderno", "Filial": "Norte"}
            ]"#,
        );
        let right = write(dir, "empresaB.csv", right_csv);
        let rename: BTreeMap<String, String> =
            [("Nome da Loja".to_owned(), "Filial".to_owned())].into();

        MergeSpec::new(
            InputSpec::new(left),
            InputSpec::new(right).with_format(Format::Csv).with_rename(rename),
            dir.join("processed").join("combinados.csv"),
        )
    }

    #[test]
    fn test_run_merge_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec(
            dir.path(),
            "Nome da Loja,Data da Venda\nLoja 1,2023-01-01\nLoja 2,2023-01-02\n",
        );

        let report = run_merge(&spec).unwrap();
        assert_eq!(report.right_columns, ["Nome da Loja", "Data da Venda"]);
        assert_eq!(report.renamed_columns, ["Filial", "Data da Venda"]);
        assert_eq!(
            report.merged_columns,
            ["Nome do Produto", "Filial", "Data da Venda"]
        );
        assert_eq!(report.merged_rows, 2);

        let written = std::fs::read_to_string(&spec.output).unwrap();
        assert_eq!(
            written,
            "Nome do Produto,Filial,Data da Venda\nCaneta,Centro,2023-01-01\nCaderno,Norte,2023-01-02\n"
        );
        assert!(report.summary().contains("into 2 rows x 3 columns"));
    }

    #[test]
    fn test_run_merge_aborts_on_row_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec(dir.path(), "Nome da Loja\nLoja 1\n");

        let err = run_merge(&spec).unwrap_err();
        assert!(matches!(
            err,
            TabmergeError::RowCountMismatch { left: 2, right: 1 }
        ));
        assert!(!spec.output.exists(), "nothing written on failure");
    }

    #[test]
    fn test_run_merge_stack_and_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let mut spec = spec(dir.path(), "Nome da Loja\nLoja 1\n");

        spec.combine = CombineMode::Zip {
            row_policy: RowCountPolicy::Truncate,
            verify_overlap: false,
        };
        assert_eq!(run_merge(&spec).unwrap().merged_rows, 1);

        spec.combine = CombineMode::Stack {
            fill: "-".to_owned(),
        };
        let report = run_merge(&spec).unwrap();
        assert_eq!(report.merged_rows, 3);
        assert_eq!(report.merged_columns, ["Nome do Produto", "Filial"]);
    }

    #[test]
    fn test_run_merge_unknown_rename_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut spec = spec(dir.path(), "Loja\nLoja 1\nLoja 2\n");
        spec.combine = CombineMode::default();

        let err = run_merge(&spec).unwrap_err();
        assert!(matches!(err, TabmergeError::UnknownColumn(name) if name == "Nome da Loja"));
    }
}

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabmerge::config::{CombineMode, MergeSpec};
use tabmerge::dataset::{Dataset, RowCountPolicy};
use tabmerge::format::Format;
use tabmerge::merge::run_merge;

#[derive(Parser)]
#[command(name = "tabmerge", about = "Merge a JSON and a CSV dataset into one CSV", version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load both inputs, rename, combine, and save the result
    Merge {
        /// Path to a JSON merge spec. Defaults to the built-in Company A / Company B merge.
        #[arg(short, long)]
        spec: Option<PathBuf>,

        /// Output file path, overriding the spec
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Row count policy for positional joins (strict, truncate)
        #[arg(long)]
        row_policy: Option<RowCountPolicy>,
    },
    /// Print the column names and row count of a dataset
    Inspect {
        /// Dataset file (JSON or CSV)
        path: PathBuf,

        /// Format of the file. Defaults to the file extension.
        #[arg(short, long)]
        format: Option<Format>,
    },
    /// Write the built-in merge spec as JSON, as a starting point for editing
    InitSpec {
        /// Destination path for the spec
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Merge {
            spec,
            output,
            row_policy,
        } => handle_merge(spec, output, row_policy),
        Commands::Inspect { path, format } => handle_inspect(&path, format),
        Commands::InitSpec { path, force } => handle_init_spec(&path, force),
    }
}

fn handle_merge(
    spec_path: Option<PathBuf>,
    output: Option<PathBuf>,
    row_policy: Option<RowCountPolicy>,
) -> Result<()> {
    let mut spec = match spec_path {
        Some(path) => {
            println!("Loading merge spec from {}...", path.display());
            MergeSpec::from_file(&path)
                .with_context(|| format!("Failed to load merge spec {}", path.display()))?
        }
        None => MergeSpec::default(),
    };

    if let Some(output) = output {
        spec.output = output;
    }

    if let Some(policy) = row_policy {
        match &mut spec.combine {
            CombineMode::Zip { row_policy, .. } => *row_policy = policy,
            other => log::warn!("--row-policy ignored for combine mode {other:?}"),
        }
    }

    let report = run_merge(&spec).context("Merge failed")?;

    println!("Columns of left input: {:?}", report.left_columns);
    println!("Rows in left input: {}", report.left_rows);
    println!("Columns of right input: {:?}", report.right_columns);
    println!("Rows in right input: {}", report.right_rows);
    println!("Columns of right input after renaming: {:?}", report.renamed_columns);
    println!("Columns of merged data: {:?}", report.merged_columns);
    println!("Rows in merged data: {}", report.merged_rows);
    println!("Merged data saved to: {}", report.output.display());
    println!("{}", report.summary());
    Ok(())
}

fn handle_inspect(path: &Path, format: Option<Format>) -> Result<()> {
    let format = match format {
        Some(f) => f,
        None => Format::from_path(path)?,
    };
    let dataset = Dataset::load(path, format)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    println!("{} ({format})", path.display());
    println!("Columns: {:?}", dataset.column_names());
    println!("Rows: {}", dataset.row_count());
    Ok(())
}

fn handle_init_spec(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }
    MergeSpec::default()
        .to_file(path)
        .with_context(|| format!("Failed to write merge spec {}", path.display()))?;
    println!("Merge spec written to {}", path.display());
    Ok(())
}

//! # tabmerge - merge two company datasets into one
//!
//! tabmerge loads a JSON dataset and a CSV dataset, renames the columns of one
//! so both follow the same naming scheme, combines them, and writes the result
//! as CSV.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabmerge::dataset::{ColumnMapping, Dataset};
//! use tabmerge::format::Format;
//!
//! # fn example() -> tabmerge::error::Result<()> {
//! let empresa_a = Dataset::load("data_raw/dados_empresaA.json", Format::Json)?;
//! let mut empresa_b = Dataset::load("data_raw/dados_empresaB.csv", Format::Csv)?;
//! println!("{:?} ({} rows)", empresa_a.column_names(), empresa_a.row_count());
//!
//! let mapping: ColumnMapping = [("Nome da Loja".to_owned(), "Filial".to_owned())].into();
//! empresa_b.rename_columns(&mapping)?;
//!
//! let fusao = empresa_a.join(&empresa_b)?;
//! fusao.save("data_processed/dados_combinados.csv")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`dataset`]: the in-memory table and its rename/join/concat operations
//! - [`format`]: JSON and CSV readers, CSV writer
//! - [`config`]: JSON merge specs
//! - [`merge`]: the load → rename → combine → save job
//! - [`error`]: error types
//! - [`logging`]: logger setup for the binary
//!
//! ## Positional joins
//!
//! [`Dataset::join`](dataset::Dataset::join) pairs rows by position. That is
//! only correct when both inputs list the same entities in the same order.
//! When the inputs share an identifier column, prefer
//! [`Dataset::join_on`](dataset::Dataset::join_on).

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod logging;
pub mod merge;

//! # tabmerge entry point
//!
//! ```bash
//! tabmerge merge                       # built-in Company A / Company B merge
//! tabmerge merge --spec merge.json     # merge described by a spec file
//! tabmerge inspect data_raw/dados_empresaB.csv
//! tabmerge init-spec merge.json
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // CLI output goes to stdout

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set RUST_LOG=debug to see detailed logs
    tabmerge::logging::init(cli.verbose)?;

    cli::run_command(cli.command)
}

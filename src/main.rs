//! # mzmerge
//!
//! Command-line front end for merging and aligning mass spectra.
//!
//! ## Usage
//!
//! ```bash
//! # Merge replicate scans into one consensus spectrum
//! mzmerge merge scan1.csv scan2.csv scan3.csv -o merged.csv
//!
//! # Align two spectra and print a similarity summary
//! mzmerge align query.csv library.csv --ppm 10
//!
//! # Merge synthetic scans and keep the results off-heap
//! mzmerge -v demo --spectra 200
//! ```

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod align;
mod demo;
mod merge;

mod config;
mod io;
mod preset;

pub use preset::Preset;

/// mzmerge - Merge, align and compare mass spectra
#[derive(Parser)]
#[command(name = "mzmerge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Merge preset for common acquisition types.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum PresetArg {
    /// Survey scans: summed intensities
    #[default]
    Ms1,
    /// Fragment scans: maximum intensities, wider window
    Ms2,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Ms1 => Preset::Ms1,
            PresetArg::Ms2 => Preset::Ms2,
        }
    }
}

/// Merge settings given on the command line; each one overrides the config file.
#[derive(clap::Args, Debug, Default)]
pub struct MergeArgs {
    /// Merge preset (ms1, ms2)
    #[arg(short = 'p', long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Absolute tolerance
    #[arg(short = 'a', long)]
    pub absolute: Option<f64>,

    /// Relative tolerance in ppm
    #[arg(long)]
    pub ppm: Option<f64>,

    /// Intensity merging (sum, max, avg)
    #[arg(short = 'i', long)]
    pub intensity: Option<String>,

    /// Center measure (avg, median)
    #[arg(long)]
    pub center: Option<String>,

    /// Center weighting (none, linear, sqrt, cbrt, log10)
    #[arg(short = 'w', long)]
    pub weighting: Option<String>,

    /// Drop input samples with intensity at or below this value
    #[arg(long)]
    pub input_floor: Option<f64>,

    /// Drop merged points with intensity at or below this value
    #[arg(long)]
    pub output_floor: Option<f64>,

    /// Drop merged points at or below this fraction of the base peak
    #[arg(long)]
    pub output_floor_relative: Option<f64>,

    /// Keep only points merged from at least this many samples
    #[arg(long)]
    pub min_cluster_size: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge spectra (one CSV file each) into a consensus spectrum
    Merge {
        /// Input spectrum files (position,intensity CSV)
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short = 'o', long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Write JSON instead of CSV
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        args: MergeArgs,
    },

    /// Align two spectra and report their similarity
    Align {
        /// First spectrum (position,intensity CSV)
        #[arg(value_name = "A")]
        a: PathBuf,

        /// Second spectrum (position,intensity CSV)
        #[arg(value_name = "B")]
        b: PathBuf,

        /// Output file for the aligned pairs (defaults to stdout)
        #[arg(short = 'o', long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Position offset added to the second spectrum
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<f64>,

        /// Absolute tolerance
        #[arg(short = 'a', long)]
        absolute: Option<f64>,

        /// Relative tolerance in ppm
        #[arg(long)]
        ppm: Option<f64>,
    },

    /// Merge synthetic scans and keep the results in off-heap storage
    Demo {
        /// Number of scans to synthesise
        #[arg(short = 's', long, default_value = "120")]
        spectra: usize,

        /// Peaks per scan
        #[arg(short = 'n', long, default_value = "400")]
        peaks: usize,

        /// Scans per merge bin
        #[arg(short = 'b', long, default_value = "10")]
        bin_width: i64,

        /// Storage segment size in bytes
        #[arg(long, default_value = "1048576")]
        segment_capacity: u64,

        /// Keep merged arrays on the heap
        #[arg(long)]
        in_ram: bool,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Merge {
            inputs,
            output,
            config,
            json,
            args,
        } => merge::run(inputs, output, config, json, args),
        Commands::Align {
            a,
            b,
            output,
            config,
            offset,
            absolute,
            ppm,
        } => align::run(a, b, output, config, offset, absolute, ppm),
        Commands::Demo {
            spectra,
            peaks,
            bin_width,
            segment_capacity,
            in_ram,
            config,
        } => demo::run(spectra, peaks, bin_width, segment_capacity, in_ram, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_merge() {
        let cli = Cli::try_parse_from([
            "mzmerge", "-v", "merge", "a.csv", "b.csv", "-p", "ms2", "--ppm", "10", "-i", "max",
        ])
        .unwrap();
        assert_eq!(cli.verbosity(), 1);
        match cli.command {
            Commands::Merge { inputs, args, json, .. } => {
                assert_eq!(inputs.len(), 2);
                assert!(!json);
                assert!(matches!(args.preset, Some(PresetArg::Ms2)));
                assert_eq!(args.ppm, Some(10.0));
                assert_eq!(args.intensity.as_deref(), Some("max"));
            }
            _ => panic!("expected merge command"),
        }
    }

    #[test]
    fn test_parse_align_negative_offset() {
        let cli = Cli::try_parse_from(["mzmerge", "align", "a.csv", "b.csv", "--offset", "-18.01"])
            .unwrap();
        match cli.command {
            Commands::Align { offset, .. } => assert_eq!(offset, Some(-18.01)),
            _ => panic!("expected align command"),
        }
    }

    #[test]
    fn test_merge_requires_input() {
        assert!(Cli::try_parse_from(["mzmerge", "merge"]).is_err());
    }
}

use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::PathBuf;

use mzmerge::merge::{MergeConfig, SpectralMerger};

use super::config::{Config, MergeSection};
use super::io;
use super::{MergeArgs, Preset};

/// Merge spectrum files into one consensus spectrum
pub fn run(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    json: bool,
    args: MergeArgs,
) -> Result<()> {
    let file_config = Config::load(config_path.as_deref())?;
    let config = resolve_config(file_config.merge, args)?;

    info!("mzmerge - Spectra Merger");
    info!("========================");
    info!("Tolerance: {}", config.tolerance);
    info!("Intensity merging: {}", config.intensity_merging);
    info!(
        "Center: {} ({} weighting)",
        config.center.measure, config.center.weighting
    );

    let spectra = inputs
        .iter()
        .map(|path| io::read_spectrum_file(path))
        .collect::<Result<Vec<_>>>()?;
    info!(
        "Read {} spectra ({} samples)",
        spectra.len(),
        spectra.iter().map(|s| s.len()).sum::<usize>()
    );

    let merger = SpectralMerger::new(config)?;
    let (merged, stats) = merger.merge_with_stats(&spectra);
    info!("{}", stats);

    let mut out = io::output(output.as_deref())?;
    if json {
        serde_json::to_writer_pretty(&mut out, &merged).context("Failed to write JSON")?;
        writeln!(out)?;
    } else {
        io::write_merged(&mut out, &merged)?;
    }
    out.flush()?;

    if let Some(path) = &output {
        info!("Wrote {} points to {}", merged.len(), path.display());
    }
    Ok(())
}

/// Layer command-line flags over the config file section.
fn resolve_config(mut section: MergeSection, args: MergeArgs) -> Result<MergeConfig> {
    if let Some(preset) = args.preset {
        section.preset = Some(Preset::from(preset).to_string());
    }
    section.absolute = args.absolute.or(section.absolute);
    section.ppm = args.ppm.or(section.ppm);
    section.intensity = args.intensity.or(section.intensity);
    section.center = args.center.or(section.center);
    section.weighting = args.weighting.or(section.weighting);
    section.input_floor = args.input_floor.or(section.input_floor);
    section.output_floor = args.output_floor.or(section.output_floor);
    section.output_floor_relative = args.output_floor_relative.or(section.output_floor_relative);
    section.min_cluster_size = args.min_cluster_size.or(section.min_cluster_size);
    section.to_merge_config()
}

use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use mzmerge::merge::{bin_spectra, SpectralMerger};
use mzmerge::spectrum::{Sample, Spectrum};
use mzmerge::storage::{store_or_keep, Storage, StoredArray};

use super::config::Config;

/// One merged bin whose arrays live in storage or on the heap
struct StoredBin<'s> {
    bin: i64,
    positions: StoredArray<'s, f64>,
    intensities: StoredArray<'s, f64>,
}

/// Merge synthetic scans in bins and keep the results off-heap
pub fn run(
    spectra: usize,
    peaks: usize,
    bin_width: i64,
    segment_capacity: u64,
    in_ram: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;
    let merge_config = config.merge.to_merge_config()?;
    let mut storage_config = config.storage.to_storage_config();
    if config.storage.segment_capacity.is_none() {
        storage_config.segment_capacity = segment_capacity;
    }
    storage_config.store_in_ram |= in_ram;

    info!("mzmerge - Merging Demo");
    info!("======================");
    info!(
        "Generating {} scans with {} peaks each, {} scans per bin",
        spectra, peaks, bin_width
    );

    let scans = generate_scans(spectra, peaks);
    let bins = bin_spectra(scans, bin_width)?;

    let merger = SpectralMerger::new(merge_config)?;
    let start = Instant::now();
    let merged = merger.merge_binned(&bins);
    let elapsed = start.elapsed();
    info!("Merged {} bins in {:.2?}", merged.len(), elapsed);

    let storage = Storage::acquire(&storage_config).context("Failed to set up storage")?;
    let mut stored = Vec::with_capacity(merged.len());
    for (bin, spectrum) in merged {
        stored.push(StoredBin {
            bin,
            positions: store_or_keep(storage.as_ref(), spectrum.positions)?,
            intensities: store_or_keep(storage.as_ref(), spectrum.intensities)?,
        });
    }

    let input_points = spectra * peaks;
    let output_points: usize = stored.iter().map(|b| b.positions.len()).sum();
    print_report(&stored, input_points, output_points);

    match &storage {
        Some(storage) => println!("{}", storage.stats()),
        None => println!("Merged arrays kept in RAM"),
    }
    Ok(())
}

fn print_report(stored: &[StoredBin<'_>], input_points: usize, output_points: usize) {
    #[cfg(feature = "colorized_output")]
    {
        use console::style;

        println!(
            "{} {} points -> {} points in {} bins",
            style("Merged").green().bold(),
            input_points,
            output_points,
            stored.len()
        );
        for bin in stored.iter().take(5) {
            println!("  {}", style(bin_line(bin)).dim());
        }
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!(
            "Merged {} points -> {} points in {} bins",
            input_points,
            output_points,
            stored.len()
        );
        for bin in stored.iter().take(5) {
            println!("  {}", bin_line(bin));
        }
    }
}

fn bin_line(bin: &StoredBin<'_>) -> String {
    let base = bin
        .positions
        .iter()
        .zip(bin.intensities.iter())
        .max_by(|a, b| a.1.total_cmp(b.1));
    match base {
        Some((position, intensity)) => format!(
            "bin {:>4}: {:>5} points, base peak {:.4} ({:.0}){}",
            bin.bin,
            bin.positions.len(),
            position,
            intensity,
            if bin.positions.is_mapped() { " [mapped]" } else { "" }
        ),
        None => format!("bin {:>4}: empty", bin.bin),
    }
}

/// Synthesise `count` replicate scans of one analyte mixture.
///
/// Peak positions wobble by a few ppm from scan to scan, intensities follow an
/// elution profile over the run.
fn generate_scans(count: usize, peaks: usize) -> Vec<(i64, Spectrum)> {
    (0..count)
        .map(|scan| {
            let run_position = scan as f64 / count.max(1) as f64;
            let elution = 1.0 - (run_position - 0.5).abs();
            let samples = (0..peaks).map(|i| {
                let mz = 300.0 + (i as f64 / peaks.max(1) as f64) * 1500.0;
                let jitter = ((scan * 31 + i) as f64 * 0.123).sin() * mz * 2e-6;
                let intensity = 1e5 * elution * (0.1 + (i as f64 * 0.456).sin().abs() * 0.9);
                Sample::new(mz + jitter, intensity)
            });
            (scan as i64, Spectrum::from_samples(samples))
        })
        .collect()
}

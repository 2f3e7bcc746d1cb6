//! CSV input and output for spectra.
//!
//! A spectrum file has a `position,intensity` header (`mz` is accepted for
//! the position column) and one sample per row.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

use mzmerge::align::AlignedPair;
use mzmerge::spectrum::{MergedSpectrum, Spectrum};

#[derive(Debug, Deserialize, Serialize)]
struct SampleRow {
    #[serde(alias = "mz")]
    position: f64,
    intensity: f64,
}

#[derive(Debug, Serialize)]
struct PairRow {
    position_a: Option<f64>,
    intensity_a: Option<f64>,
    position_b: Option<f64>,
    intensity_b: Option<f64>,
}

/// Read one spectrum from CSV.
pub fn read_spectrum<R: Read>(reader: R) -> Result<Spectrum> {
    let mut rows = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut positions = Vec::new();
    let mut intensities = Vec::new();
    for (line, row) in rows.deserialize::<SampleRow>().enumerate() {
        let row = row.with_context(|| format!("Invalid sample on data row {}", line + 1))?;
        positions.push(row.position);
        intensities.push(row.intensity);
    }
    Ok(Spectrum::new(positions, intensities)?)
}

/// Read one spectrum from a CSV file.
pub fn read_spectrum_file(path: &Path) -> Result<Spectrum> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open spectrum file: {}", path.display()))?;
    read_spectrum(file).with_context(|| format!("Failed to read spectrum: {}", path.display()))
}

/// Write a merged spectrum as CSV.
pub fn write_merged<W: Write>(writer: W, merged: &MergedSpectrum) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for sample in merged.samples() {
        out.serialize(SampleRow {
            position: sample.position,
            intensity: sample.intensity,
        })?;
    }
    out.flush()?;
    Ok(())
}

/// Write aligned pairs as CSV; unmatched sides are left empty.
pub fn write_pairs<W: Write>(writer: W, pairs: &[AlignedPair]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for pair in pairs {
        out.serialize(PairRow {
            position_a: pair.a.map(|s| s.position),
            intensity_a: pair.a.map(|s| s.intensity),
            position_b: pair.b.map(|s| s.position),
            intensity_b: pair.b.map(|s| s.intensity),
        })?;
    }
    out.flush()?;
    Ok(())
}

/// Open `path` for writing, or stdout when no path is given.
pub fn output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(std::io::BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout().lock())),
    }
}

use anyhow::Result;
use log::info;
use std::io::Write;
use std::path::PathBuf;

use mzmerge::align::{align_with_offset, AlignmentSummary};
use mzmerge::tolerance::ToleranceWindow;

use super::config::Config;
use super::io;

/// Align two spectrum files and report how well they agree
pub fn run(
    a: PathBuf,
    b: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    offset: Option<f64>,
    absolute: Option<f64>,
    ppm: Option<f64>,
) -> Result<()> {
    let mut section = Config::load(config_path.as_deref())?.align;
    section.absolute = absolute.or(section.absolute);
    section.ppm = ppm.or(section.ppm);
    let offset = offset.or(section.offset).unwrap_or(0.0);
    let tolerance = section.tolerance(ToleranceWindow::default_ms2_merge())?;

    info!("Aligning {} against {}", a.display(), b.display());
    info!("Tolerance: {}, offset: {}", tolerance, offset);

    let spectrum_a = io::read_spectrum_file(&a)?;
    let spectrum_b = io::read_spectrum_file(&b)?;

    let pairs = align_with_offset(&spectrum_a, &spectrum_b, tolerance, offset);
    let summary = AlignmentSummary::from_pairs(&pairs);

    let mut out = io::output(output.as_deref())?;
    io::write_pairs(&mut out, &pairs)?;
    out.flush()?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &AlignmentSummary) {
    #[cfg(feature = "colorized_output")]
    {
        use console::style;

        let cosine = if summary.cosine >= 0.7 {
            style(format!("{:.4}", summary.cosine)).green().bold()
        } else {
            style(format!("{:.4}", summary.cosine)).yellow().bold()
        };
        eprintln!(
            "{} {} of {} / {} samples matched, cosine {}",
            style("Alignment:").cyan().bold(),
            summary.matched,
            summary.size_a,
            summary.size_b,
            cosine
        );
        eprintln!(
            "  explained intensity: {:.1}% / {:.1}%",
            summary.explained_intensity_a * 100.0,
            summary.explained_intensity_b * 100.0
        );
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        eprintln!("{}", summary);
    }
}

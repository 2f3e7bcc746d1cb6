#![no_main]

use libfuzzer_sys::fuzz_target;
use mzmerge::merge::{MergeConfig, SpectralMerger};
use mzmerge::spectrum::Spectrum;
use mzmerge::tolerance::ToleranceWindow;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First two bytes pick the tolerance, the rest is a list of
    // (spectrum, position, intensity) records.
    let absolute = data[0] as f64 / 1000.0;
    let ppm = data[1] as f64;
    let Ok(tolerance) = ToleranceWindow::from_ppm(absolute, ppm) else {
        return;
    };

    let mut spectra: Vec<(Vec<f64>, Vec<f64>)> = vec![(Vec::new(), Vec::new()); 4];
    for record in data[2..].chunks_exact(5) {
        let source = (record[0] % 4) as usize;
        let position = 100.0 + u16::from_le_bytes([record[1], record[2]]) as f64 / 64.0;
        let intensity = u16::from_le_bytes([record[3], record[4]]) as f64;
        spectra[source].0.push(position);
        spectra[source].1.push(intensity);
    }
    let spectra: Vec<Spectrum> = spectra
        .into_iter()
        .filter_map(|(p, i)| Spectrum::new(p, i).ok())
        .collect();

    let merger = SpectralMerger::new(MergeConfig::with_tolerance(tolerance)).unwrap();
    let merged = merger.merge(&spectra);
    assert!(merged.positions.windows(2).all(|w| w[0] <= w[1]));

    let clusters = merger.merge_clusters(&spectra);
    for cluster in &clusters {
        let mut sources: Vec<usize> = cluster.members.iter().map(|m| m.source).collect();
        sources.sort_unstable();
        let count = sources.len();
        sources.dedup();
        assert_eq!(sources.len(), count, "cluster holds a source twice");
    }
    let intervals: Vec<_> = clusters.iter().filter_map(|c| c.interval).collect();
    for (i, a) in intervals.iter().enumerate() {
        for b in &intervals[i + 1..] {
            assert!(!a.overlaps(b), "{} overlaps {}", a, b);
        }
    }
});

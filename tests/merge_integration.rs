//! Integration tests for spectra merging
//!
//! These tests drive the public merge API end to end and check the
//! clustering guarantees on random input.

use mzmerge::merge::{
    CenterFunction, IntensityMerging, IntervalClusterMap, MergeConfig, SpectralMerger,
};
use mzmerge::spectrum::{IndexedSample, Spectrum};
use mzmerge::tolerance::ToleranceWindow;

fn spectrum(samples: &[(f64, f64)]) -> Spectrum {
    let (positions, intensities) = samples.iter().copied().unzip();
    Spectrum::new(positions, intensities).unwrap()
}

fn summed_unweighted(absolute: f64) -> SpectralMerger {
    SpectralMerger::new(MergeConfig {
        intensity_merging: IntensityMerging::Summed,
        center: CenterFunction::unweighted(),
        ..MergeConfig::with_tolerance(ToleranceWindow::absolute_only(absolute).unwrap())
    })
    .unwrap()
}

/// Three spectra with one sample each at the same position sum up
#[test]
fn test_three_replicates_sum_to_one_point() {
    let merger = summed_unweighted(0.01);
    let merged = merger.merge(&[
        spectrum(&[(100.0, 10.0)]),
        spectrum(&[(100.0, 20.0)]),
        spectrum(&[(100.0, 5.0)]),
    ]);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged.positions[0], 100.0);
    assert_eq!(merged.intensities[0], 35.0);
}

/// A source pushed twice at the same position never doubles a cluster
#[test]
fn test_same_source_twice_gives_two_clusters() {
    let mut map = IntervalClusterMap::new(ToleranceWindow::absolute_only(0.01).unwrap());
    let first = map.insert(IndexedSample::new(100.0, 10.0, 0));
    let second = map.insert(IndexedSample::new(100.0, 10.0, 0));

    assert_ne!(first, second);
    assert_eq!(map.len(), 2);
    assert!(map.clusters().iter().all(|c| c.len() == 1));
}

/// Two MS1 scans of a small mixture, with realistic ppm deviations
#[test]
fn test_ms1_replicates_keep_isotope_pattern() {
    let scan_a = spectrum(&[
        (524.2650, 8.0e5),
        (524.7665, 3.9e5),
        (525.2680, 1.1e5),
        (612.3101, 2.0e4),
    ]);
    let scan_b = spectrum(&[
        (524.2655, 7.6e5),
        (524.7661, 4.1e5),
        (525.2684, 0.9e5),
        (700.1000, 1.5e3),
    ]);

    let config = MergeConfig {
        output_floor: Some(5.0e3),
        ..MergeConfig::ms1()
    };
    let (merged, stats) = SpectralMerger::new(config)
        .unwrap()
        .merge_with_stats(&[scan_a, scan_b]);

    assert_eq!(stats.spectra, 2);
    assert_eq!(stats.samples_clustered, 8);
    assert_eq!(stats.clusters, 5);
    assert_eq!(merged.len(), 4);
    assert!((merged.intensities[0] - 15.6e5).abs() < 1.0);
    assert!((merged.positions[0] - 524.2652).abs() < 1e-3);
    assert_eq!(merged.positions[3], 612.3101);
}

/// Merging a scan with itself under averaging reproduces it
#[test]
fn test_self_merge_with_average_is_identity() {
    let merger = SpectralMerger::new(MergeConfig {
        intensity_merging: IntensityMerging::Average,
        ..MergeConfig::with_tolerance(ToleranceWindow::absolute_only(0.02).unwrap())
    })
    .unwrap();
    let scan = spectrum(&[(150.0, 3.0), (150.01, 9.0), (300.0, 1.0)]);

    let merged = merger.merge(&[scan.clone(), scan.clone()]);
    assert_eq!(merged.positions, scan.positions());
    assert_eq!(merged.intensities, scan.intensities());
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn spectra_strategy() -> impl Strategy<Value = Vec<Vec<(f64, f64)>>> {
        prop::collection::vec(
            prop::collection::vec((100.0f64..101.0, 1.0f64..1000.0), 0..25),
            0..6,
        )
    }

    fn merger() -> SpectralMerger {
        SpectralMerger::new(MergeConfig::with_tolerance(
            ToleranceWindow::from_ppm(0.01, 20.0).unwrap(),
        ))
        .unwrap()
    }

    proptest! {
        /// The merged spectrum does not depend on the order of spectra or samples
        #[test]
        fn test_merge_is_order_independent(input in spectra_strategy()) {
            let forward: Vec<Spectrum> = input.iter().map(|s| spectrum(s)).collect();
            let backward: Vec<Spectrum> = input
                .iter()
                .rev()
                .map(|s| {
                    let mut samples = s.clone();
                    samples.reverse();
                    let half = samples.len() / 2;
                    samples.rotate_left(half);
                    spectrum(&samples)
                })
                .collect();

            let merger = merger();
            let a = merger.merge(&forward);
            let b = merger.merge(&backward);

            prop_assert_eq!(a.len(), b.len());
            for i in 0..a.len() {
                prop_assert!((a.positions[i] - b.positions[i]).abs() < 1e-9);
                prop_assert!((a.intensities[i] - b.intensities[i]).abs() < 1e-9);
            }
        }

        /// No cluster holds two samples of one spectrum and intervals never overlap
        #[test]
        fn test_clusters_are_source_unique_and_disjoint(input in spectra_strategy()) {
            let spectra: Vec<Spectrum> = input.iter().map(|s| spectrum(s)).collect();
            let clusters = merger().merge_clusters(&spectra);

            let total: usize = clusters.iter().map(|c| c.len()).sum();
            prop_assert_eq!(total, input.iter().map(Vec::len).sum::<usize>());

            for cluster in &clusters {
                let mut sources: Vec<usize> = cluster.members.iter().map(|m| m.source).collect();
                sources.sort_unstable();
                let count = sources.len();
                sources.dedup();
                prop_assert_eq!(sources.len(), count);
            }

            let mut intervals: Vec<_> = clusters.iter().filter_map(|c| c.interval).collect();
            intervals.sort_by(|a, b| a.lower.value.total_cmp(&b.lower.value));
            for (i, a) in intervals.iter().enumerate() {
                for b in &intervals[i + 1..] {
                    prop_assert!(!a.overlaps(b), "{} overlaps {}", a, b);
                }
            }
        }

        /// Output positions come back in ascending order
        #[test]
        fn test_output_is_sorted(input in spectra_strategy()) {
            let spectra: Vec<Spectrum> = input.iter().map(|s| spectrum(s)).collect();
            let merged = merger().merge(&spectra);

            prop_assert_eq!(merged.positions.len(), merged.intensities.len());
            for pair in merged.positions.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}

//! Integration tests for pairwise alignment

use mzmerge::align::{
    align, align_modification_aware, crop_to_overlap, remove_unaligned, AlignmentSummary,
};
use mzmerge::spectrum::{Sample, Spectrum};
use mzmerge::tolerance::ToleranceWindow;

fn spectrum(samples: &[(f64, f64)]) -> Spectrum {
    let (positions, intensities) = samples.iter().copied().unzip();
    Spectrum::new(positions, intensities).unwrap()
}

fn sorted(mut samples: Vec<Sample>) -> Vec<Sample> {
    samples.sort_by(|a, b| {
        a.position
            .total_cmp(&b.position)
            .then(a.intensity.total_cmp(&b.intensity))
    });
    samples
}

/// Fragment spectra of a peptide and its oxidized form
#[test]
fn test_modified_precursor_alignment() {
    let unmodified = spectrum(&[(175.119, 50.0), (304.162, 80.0), (433.204, 30.0)]);
    // the last fragment carries the +15.995 modification
    let oxidized = spectrum(&[(175.119, 45.0), (304.162, 70.0), (449.199, 35.0)]);
    let tolerance = ToleranceWindow::from_ppm(0.005, 10.0).unwrap();

    let plain = align(&unmodified, &oxidized, tolerance);
    assert_eq!(remove_unaligned(&plain).len(), 2);

    let aware = align_modification_aware(&unmodified, &oxidized, tolerance, 500.25, 516.245);
    assert_eq!(remove_unaligned(&aware).len(), 3);

    let summary = AlignmentSummary::from_pairs(&aware);
    assert_eq!(summary.matched, 3);
    assert!((summary.explained_intensity_a - 1.0).abs() < 1e-12);
    assert!(summary.cosine > 0.95);
}

/// Cropping keeps only the shared position range
#[test]
fn test_crop_then_align() {
    let a = spectrum(&[(50.0, 1.0), (100.0, 5.0), (150.0, 3.0)]);
    let b = spectrum(&[(100.002, 4.0), (150.001, 2.0), (400.0, 9.0)]);
    let tolerance = ToleranceWindow::absolute_only(0.01).unwrap();

    let (a, b) = crop_to_overlap(tolerance, &a, &b);
    assert_eq!(a.positions(), &[100.0, 150.0]);
    assert_eq!(b.positions(), &[100.002, 150.001]);

    let pairs = align(&a, &b, tolerance);
    assert!(pairs.iter().all(|p| p.is_matched()));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn samples_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((200.0f64..201.0, 0.0f64..100.0), 0..30)
    }

    proptest! {
        /// Every sample appears in exactly one pair and matches respect tolerance
        #[test]
        fn test_alignment_covers_every_sample(
            a in samples_strategy(),
            b in samples_strategy(),
            absolute in 0.0f64..0.05,
        ) {
            let sa = spectrum(&a);
            let sb = spectrum(&b);
            let tolerance = ToleranceWindow::from_ppm(absolute, 5.0).unwrap();
            let pairs = align(&sa, &sb, tolerance);

            let matched = pairs.iter().filter(|p| p.is_matched()).count();
            prop_assert_eq!(pairs.len(), matched + (a.len() - matched) + (b.len() - matched));
            prop_assert!(pairs.iter().all(|p| p.a.is_some() || p.b.is_some()));

            let from_a: Vec<Sample> = pairs.iter().filter_map(|p| p.a).collect();
            let from_b: Vec<Sample> = pairs.iter().filter_map(|p| p.b).collect();
            prop_assert_eq!(sorted(from_a), sorted(sa.samples().collect()));
            prop_assert_eq!(sorted(from_b), sorted(sb.samples().collect()));

            for pair in &pairs {
                if let (Some(x), Some(y)) = (pair.a, pair.b) {
                    prop_assert!(tolerance.matches(x.position, y.position));
                }
            }
        }
    }
}

use super::*;
use crate::spectrum::{Sample, Spectrum};
use crate::tolerance::ToleranceWindow;

fn spectrum(positions: &[f64], intensities: &[f64]) -> Spectrum {
    Spectrum::new(positions.to_vec(), intensities.to_vec()).unwrap()
}

fn tol(absolute: f64) -> ToleranceWindow {
    ToleranceWindow::absolute_only(absolute).unwrap()
}

fn matched_count(pairs: &[AlignedPair]) -> usize {
    pairs.iter().filter(|p| p.is_matched()).count()
}

#[test]
fn test_align_basic_order() {
    let a = spectrum(&[100.0, 150.0, 200.0], &[10.0, 5.0, 1.0]);
    let b = spectrum(&[100.004, 250.0], &[8.0, 2.0]);
    let pairs = align(&a, &b, tol(0.01));

    assert_eq!(
        pairs,
        vec![
            AlignedPair::matched(Sample::new(100.0, 10.0), Sample::new(100.004, 8.0)),
            AlignedPair::only_a(Sample::new(150.0, 5.0)),
            AlignedPair::only_a(Sample::new(200.0, 1.0)),
            AlignedPair::only_b(Sample::new(250.0, 2.0)),
        ]
    );
}

#[test]
fn test_strongest_candidate_wins() {
    let a = spectrum(&[100.0], &[10.0]);
    let b = spectrum(&[99.995, 100.005], &[1.0, 5.0]);
    let pairs = align(&a, &b, tol(0.01));

    assert_eq!(pairs[0], AlignedPair::matched(Sample::new(100.0, 10.0), Sample::new(100.005, 5.0)));
    assert_eq!(pairs[1], AlignedPair::only_b(Sample::new(99.995, 1.0)));
}

#[test]
fn test_each_b_matched_at_most_once() {
    let a = spectrum(&[100.0, 100.002], &[10.0, 9.0]);
    let b = spectrum(&[100.001], &[5.0]);
    let pairs = align(&a, &b, tol(0.01));

    assert_eq!(pairs.len(), 2);
    assert_eq!(matched_count(&pairs), 1);
    assert_eq!(pairs[0].a, Some(Sample::new(100.0, 10.0)));
    assert!(pairs[0].is_matched());
    assert_eq!(pairs[1], AlignedPair::only_a(Sample::new(100.002, 9.0)));
}

#[test]
fn test_equal_intensities_keep_input_order() {
    let a = spectrum(&[2.0, 1.0, 3.0], &[5.0, 5.0, 5.0]);
    let b = Spectrum::empty();
    let pairs = align(&a, &b, tol(0.01));
    let order: Vec<f64> = pairs.iter().filter_map(|p| p.a).map(|s| s.position).collect();
    assert_eq!(order, vec![2.0, 1.0, 3.0]);
}

#[test]
fn test_empty_inputs() {
    let empty = Spectrum::empty();
    assert!(align(&empty, &empty, tol(0.01)).is_empty());

    let b = spectrum(&[1.0, 2.0], &[1.0, 3.0]);
    let pairs = align(&empty, &b, tol(0.01));
    assert_eq!(
        pairs,
        vec![
            AlignedPair::only_b(Sample::new(2.0, 3.0)),
            AlignedPair::only_b(Sample::new(1.0, 1.0)),
        ]
    );
}

#[test]
fn test_align_with_offset() {
    let a = spectrum(&[110.0, 50.0], &[10.0, 5.0]);
    let b = spectrum(&[100.0, 50.0], &[10.0, 5.0]);

    let shifted = align_with_offset(&a, &b, tol(0.01), 10.0);
    assert_eq!(matched_count(&shifted), 1);
    assert_eq!(shifted[0], AlignedPair::matched(Sample::new(110.0, 10.0), Sample::new(100.0, 10.0)));

    let plain = align(&a, &b, tol(0.01));
    assert_eq!(matched_count(&plain), 1);
    assert_eq!(plain[1], AlignedPair::matched(Sample::new(50.0, 5.0), Sample::new(50.0, 5.0)));
}

#[test]
fn test_modification_aware_alignment() {
    let a = spectrum(&[50.0, 180.0], &[10.0, 8.0]);
    let b = spectrum(&[50.0, 160.0], &[9.0, 7.0]);

    let pairs = align_modification_aware(&a, &b, tol(0.01), 300.0, 280.0);
    assert_eq!(matched_count(&pairs), 2);
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[1].b, Some(Sample::new(160.0, 7.0)));

    assert_eq!(matched_count(&align(&a, &b, tol(0.01))), 1);

    // without usable precursors this is a plain alignment
    let fallback = align_modification_aware(&a, &b, tol(0.01), 0.0, 280.0);
    assert_eq!(fallback, align(&a, &b, tol(0.01)));
}

#[test]
fn test_relative_tolerance_uses_midpoint() {
    let tolerance = ToleranceWindow::new(0.0, 0.1).unwrap();
    let a = spectrum(&[100.0], &[1.0]);
    let b = spectrum(&[110.5], &[1.0]);

    // |a - b| exceeds the window at a but not at the midpoint
    assert!(tolerance.half_width(100.0) < 10.5);
    assert!(tolerance.matches(100.0, 110.5));
    assert_eq!(matched_count(&align(&a, &b, tolerance)), 1);
    assert_eq!(matched_count(&align(&b, &a, tolerance)), 1);
}

#[test]
fn test_alignment_covers_every_sample_once() {
    let a = spectrum(
        &[100.0, 100.003, 101.0, 150.0, 150.02, 300.0],
        &[5.0, 9.0, 1.0, 4.0, 4.0, 2.0],
    );
    let b = spectrum(&[99.998, 100.004, 150.01, 299.0], &[3.0, 3.0, 8.0, 1.0]);
    let pairs = align(&a, &b, tol(0.01));

    let matched = matched_count(&pairs);
    let a_count = pairs.iter().filter(|p| p.a.is_some()).count();
    let b_count = pairs.iter().filter(|p| p.b.is_some()).count();
    assert_eq!(a_count, a.len());
    assert_eq!(b_count, b.len());
    assert_eq!(pairs.len(), matched + (a.len() - matched) + (b.len() - matched));

    let mut seen_b: Vec<f64> = pairs.iter().filter_map(|p| p.b).map(|s| s.position).collect();
    seen_b.sort_by(|x, y| x.total_cmp(y));
    assert_eq!(seen_b, vec![99.998, 100.004, 150.01, 299.0]);

    for pair in &pairs {
        assert!(pair.a.is_some() || pair.b.is_some());
    }
}

#[test]
fn test_remove_unaligned() {
    let a = spectrum(&[100.0, 150.0], &[10.0, 5.0]);
    let b = spectrum(&[100.0, 250.0], &[8.0, 2.0]);
    let pairs = align(&a, &b, tol(0.01));
    let kept = remove_unaligned(&pairs);
    assert_eq!(kept.len(), 1);
    assert!(kept[0].is_matched());
}

#[test]
fn test_crop_to_overlap() {
    let a = spectrum(&[50.0, 100.0, 150.0, 300.0], &[1.0; 4]);
    let b = spectrum(&[90.0, 120.0, 200.0], &[1.0; 3]);
    let (ca, cb) = crop_to_overlap(tol(1.0), &a, &b);
    assert_eq!(ca.positions(), &[100.0, 150.0]);
    assert_eq!(cb.positions(), &[90.0, 120.0, 200.0]);

    let far = spectrum(&[1.0, 2.0], &[1.0, 1.0]);
    let (x, y) = crop_to_overlap(tol(0.1), &far, &b);
    assert!(x.is_empty() && y.is_empty());

    let (x, y) = crop_to_overlap(tol(0.1), &Spectrum::empty(), &b);
    assert!(x.is_empty() && y.is_empty());
}

#[test]
fn test_intensity_matrix_weighted() {
    let pairs = vec![
        AlignedPair::matched(Sample::new(100.0, 4.0), Sample::new(100.0, 9.0)),
        AlignedPair::only_a(Sample::new(10.0, 16.0)),
    ];
    let close = |x: f64, y: f64| (x - y).abs() < 1e-9;

    let matrix = intensity_matrix_weighted(&pairs, 0.5, 0.0);
    assert_eq!(matrix.len(), 2);
    assert!(close(matrix[0][0], 2.0) && close(matrix[0][1], 3.0));
    assert!(close(matrix[1][0], 4.0));
    assert_eq!(matrix[1][1], 0.0);

    let matrix = intensity_matrix_weighted(&pairs, 0.5, 1.0);
    assert!(close(matrix[0][0], 200.0) && close(matrix[0][1], 300.0));
}

#[test]
fn test_cosine_similarity() {
    assert!((cosine_similarity(&[[1.0, 1.0], [2.0, 2.0]]) - 1.0).abs() < 1e-12);
    assert_eq!(cosine_similarity(&[[1.0, 0.0], [0.0, 1.0]]), 0.0);
    assert_eq!(cosine_similarity(&[]), 0.0);
    assert_eq!(cosine_similarity(&[[1.0, 0.0]]), 0.0);
}

#[test]
fn test_alignment_summary() {
    let a = spectrum(&[100.0, 150.0, 200.0], &[10.0, 5.0, 1.0]);
    let b = spectrum(&[100.004, 250.0], &[8.0, 2.0]);
    let summary = AlignmentSummary::from_pairs(&align(&a, &b, tol(0.01)));

    assert_eq!(summary.matched, 1);
    assert_eq!(summary.size_a, 3);
    assert_eq!(summary.size_b, 2);
    assert!((summary.explained_intensity_a - 10.0 / 16.0).abs() < 1e-12);
    assert!((summary.explained_intensity_b - 0.8).abs() < 1e-12);
    assert!(summary.cosine > 0.0 && summary.cosine < 1.0);
    assert!(summary.to_string().starts_with("Matched 1 of 3 / 2 samples"));

    let empty = AlignmentSummary::from_pairs(&[]);
    assert_eq!(empty.explained_intensity_a, 0.0);
    assert_eq!(empty.cosine, 0.0);
}

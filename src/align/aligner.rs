use serde::{Deserialize, Serialize};

use crate::search::index_range_by_key;
use crate::spectrum::{Sample, Spectrum};
use crate::tolerance::ToleranceWindow;

/// One row of an alignment: a sample of `a`, of `b`, or a matched pair.
///
/// Never both `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    /// Sample of the first spectrum
    pub a: Option<Sample>,
    /// Sample of the second spectrum
    pub b: Option<Sample>,
}

impl AlignedPair {
    /// Matched pair
    pub fn matched(a: Sample, b: Sample) -> Self {
        Self {
            a: Some(a),
            b: Some(b),
        }
    }

    /// Sample of `a` without partner
    pub fn only_a(a: Sample) -> Self {
        Self { a: Some(a), b: None }
    }

    /// Sample of `b` without partner
    pub fn only_b(b: Sample) -> Self {
        Self { a: None, b: Some(b) }
    }

    /// Whether both sides are present
    pub fn is_matched(&self) -> bool {
        self.a.is_some() && self.b.is_some()
    }
}

/// Align two spectra one-to-one within `tolerance`.
///
/// Samples of `a` are visited strongest first; each takes the strongest
/// remaining sample of `b` within tolerance. Leftover samples of `b` follow
/// in descending intensity. Every input sample appears in exactly one pair.
///
/// The matching is greedy and never revisits an earlier choice, so it is not
/// guaranteed to maximise the number of matches.
pub fn align(a: &Spectrum, b: &Spectrum, tolerance: ToleranceWindow) -> Vec<AlignedPair> {
    align_greedy(a, b, tolerance, &[0.0])
}

/// [`align`] where `b` positions are shifted by `offset` before matching
pub fn align_with_offset(
    a: &Spectrum,
    b: &Spectrum,
    tolerance: ToleranceWindow,
    offset: f64,
) -> Vec<AlignedPair> {
    align_greedy(a, b, tolerance, &[offset])
}

/// Alignment of fragment spectra of two precursors that may differ by a
/// modification.
///
/// A sample of `b` matches either directly or shifted by
/// `precursor_a - precursor_b`. Falls back to [`align`] when either precursor
/// is not positive.
pub fn align_modification_aware(
    a: &Spectrum,
    b: &Spectrum,
    tolerance: ToleranceWindow,
    precursor_a: f64,
    precursor_b: f64,
) -> Vec<AlignedPair> {
    if !(precursor_a > 0.0 && precursor_b > 0.0) {
        return align(a, b, tolerance);
    }
    let delta = precursor_a - precursor_b;
    if delta == 0.0 {
        align(a, b, tolerance)
    } else {
        align_greedy(a, b, tolerance, &[0.0, delta])
    }
}

/// Upper bound on `|a - b|` for any `b` with `tolerance.matches(a, b)`.
///
/// The window is evaluated at the midpoint, which can lie up to half the
/// distance further out than `a`.
fn search_radius(tolerance: ToleranceWindow, position: f64) -> f64 {
    let relative = tolerance.relative();
    if relative < 2.0 {
        let radius = tolerance.half_width(position) / (1.0 - relative / 2.0);
        // rounding slack; matches() has the final word
        radius + (position.abs() + radius) * 1e-12
    } else {
        f64::INFINITY
    }
}

fn align_greedy(
    a: &Spectrum,
    b: &Spectrum,
    tolerance: ToleranceWindow,
    offsets: &[f64],
) -> Vec<AlignedPair> {
    let a_sorted = a.sorted_by_intensity();
    let b_sorted = b.sorted_by_intensity();

    // b ranks (intensity order) sorted by position
    let mut by_position: Vec<usize> = (0..b_sorted.len()).collect();
    by_position.sort_by(|&i, &j| {
        b_sorted[i]
            .position
            .total_cmp(&b_sorted[j].position)
            .then(i.cmp(&j))
    });
    let mut taken = vec![false; b_sorted.len()];
    let mut pairs = Vec::with_capacity(a_sorted.len() + b_sorted.len());

    for sample in &a_sorted {
        let radius = search_radius(tolerance, sample.position);
        let mut best: Option<usize> = None;

        for &offset in offsets {
            let target = sample.position - offset;
            let range = index_range_by_key(
                by_position.len(),
                target - radius,
                target + radius,
                |i| b_sorted[by_position[i]].position,
            );
            for &rank in &by_position[range] {
                if taken[rank] || best.map_or(false, |best| best < rank) {
                    continue;
                }
                if tolerance.matches(sample.position, b_sorted[rank].position + offset) {
                    best = Some(rank);
                }
            }
        }

        match best {
            Some(rank) => {
                taken[rank] = true;
                pairs.push(AlignedPair::matched(*sample, b_sorted[rank]));
            }
            None => pairs.push(AlignedPair::only_a(*sample)),
        }
    }

    pairs.extend(
        b_sorted
            .iter()
            .zip(&taken)
            .filter(|&(_, &taken)| !taken)
            .map(|(sample, _)| AlignedPair::only_b(*sample)),
    );
    pairs
}

/// Keep only matched pairs
pub fn remove_unaligned(pairs: &[AlignedPair]) -> Vec<AlignedPair> {
    pairs.iter().filter(|p| p.is_matched()).copied().collect()
}

/// Restrict both spectra to the position range they share.
///
/// The shared range `[max(min_a, min_b), min(max_a, max_b)]` is widened by the
/// tolerance at each end. Returns two empty spectra if either input is empty
/// or the ranges do not overlap.
pub fn crop_to_overlap(tolerance: ToleranceWindow, a: &Spectrum, b: &Spectrum) -> (Spectrum, Spectrum) {
    let (Some((min_a, max_a)), Some((min_b, max_b))) = (extent(a), extent(b)) else {
        return (Spectrum::empty(), Spectrum::empty());
    };
    let low = min_a.max(min_b);
    let high = max_a.min(max_b);
    let low = low - tolerance.half_width(low);
    let high = high + tolerance.half_width(high);
    if low > high {
        return (Spectrum::empty(), Spectrum::empty());
    }
    let crop = |s: &Spectrum| {
        Spectrum::from_samples(s.samples().filter(|x| x.position >= low && x.position <= high))
    };
    (crop(a), crop(b))
}

fn extent(spectrum: &Spectrum) -> Option<(f64, f64)> {
    spectrum.positions().iter().fold(None, |acc, &p| match acc {
        None => Some((p, p)),
        Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
    })
}

use std::fmt;

use serde::{Deserialize, Serialize};

use super::aligner::AlignedPair;
use crate::spectrum::Sample;

/// Exponents turning a sample into a similarity weight:
/// `intensity^intensity_exponent * position^position_exponent`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    /// Exponent applied to the intensity
    pub intensity_exponent: f64,
    /// Exponent applied to the position
    pub position_exponent: f64,
}

impl SimilarityWeights {
    /// Raw intensities
    pub fn none() -> Self {
        Self {
            intensity_exponent: 1.0,
            position_exponent: 0.0,
        }
    }

    /// Square-rooted intensities
    pub fn sqrt() -> Self {
        Self {
            intensity_exponent: 0.5,
            position_exponent: 0.0,
        }
    }

    /// MassBank weighting: sqrt(intensity) * position^2
    pub fn massbank() -> Self {
        Self {
            intensity_exponent: 0.5,
            position_exponent: 2.0,
        }
    }

    fn weigh(&self, sample: Option<Sample>) -> f64 {
        match sample {
            Some(s) => s.intensity.powf(self.intensity_exponent) * s.position.powf(self.position_exponent),
            None => 0.0,
        }
    }
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self::sqrt()
    }
}

/// Weighted intensity matrix: one `[a, b]` row per pair, 0.0 for a missing side
pub fn intensity_matrix_weighted(
    pairs: &[AlignedPair],
    intensity_exponent: f64,
    position_exponent: f64,
) -> Vec<[f64; 2]> {
    let weights = SimilarityWeights {
        intensity_exponent,
        position_exponent,
    };
    pairs
        .iter()
        .map(|p| [weights.weigh(p.a), weights.weigh(p.b)])
        .collect()
}

/// Cosine similarity of the two matrix columns; 0.0 if either column is all zero
pub fn cosine_similarity(matrix: &[[f64; 2]]) -> f64 {
    let (dot, norm_a, norm_b) = matrix
        .iter()
        .fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), &[a, b]| {
            (dot + a * b, na + a * a, nb + b * b)
        });
    let divisor = norm_a.sqrt() * norm_b.sqrt();
    if divisor > 0.0 {
        dot / divisor
    } else {
        0.0
    }
}

/// Match counts and explained intensity of an alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    /// Matched pairs
    pub matched: usize,
    /// Samples of `a`
    pub size_a: usize,
    /// Samples of `b`
    pub size_b: usize,
    /// Fraction of the total intensity of `a` in matched pairs
    pub explained_intensity_a: f64,
    /// Fraction of the total intensity of `b` in matched pairs
    pub explained_intensity_b: f64,
    /// Cosine similarity with the given weights
    pub cosine: f64,
}

impl AlignmentSummary {
    /// Summarize `pairs` using the default (square root) weights
    pub fn from_pairs(pairs: &[AlignedPair]) -> Self {
        Self::from_pairs_weighted(pairs, SimilarityWeights::default())
    }

    /// Summarize `pairs` with explicit cosine weights
    pub fn from_pairs_weighted(pairs: &[AlignedPair], weights: SimilarityWeights) -> Self {
        let mut summary = Self::default();
        let (mut total_a, mut total_b) = (0.0, 0.0);
        let (mut explained_a, mut explained_b) = (0.0, 0.0);

        for pair in pairs {
            if let (Some(a), Some(b)) = (pair.a, pair.b) {
                summary.matched += 1;
                explained_a += a.intensity;
                explained_b += b.intensity;
            }
            if let Some(a) = pair.a {
                summary.size_a += 1;
                total_a += a.intensity;
            }
            if let Some(b) = pair.b {
                summary.size_b += 1;
                total_b += b.intensity;
            }
        }

        summary.explained_intensity_a = fraction(explained_a, total_a);
        summary.explained_intensity_b = fraction(explained_b, total_b);
        summary.cosine = cosine_similarity(&intensity_matrix_weighted(
            pairs,
            weights.intensity_exponent,
            weights.position_exponent,
        ));
        summary
    }
}

fn fraction(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total
    } else {
        0.0
    }
}

impl fmt::Display for AlignmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Matched {} of {} / {} samples (explained intensity {:.1}% / {:.1}%, cosine {:.4})",
            self.matched,
            self.size_a,
            self.size_b,
            self.explained_intensity_a * 100.0,
            self.explained_intensity_b * 100.0,
            self.cosine
        )
    }
}

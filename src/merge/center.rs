//! Centroid calculation for merged clusters.
//!
//! A [`CenterFunction`] pairs a measure (weighted mean or median) with a
//! weighting transform applied to member intensities. The same weights feed
//! both the numerator and the normalisation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MergeError;

/// How member positions are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CenterMeasure {
    /// Weighted arithmetic mean
    #[default]
    Avg,
    /// Median; the weighted median when a weighting is set
    Median,
}

impl CenterMeasure {
    /// Returns all accepted measure names.
    pub fn variants() -> &'static [&'static str] {
        &["avg", "median"]
    }
}

impl fmt::Display for CenterMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CenterMeasure::Avg => write!(f, "avg"),
            CenterMeasure::Median => write!(f, "median"),
        }
    }
}

impl FromStr for CenterMeasure {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "avg" | "average" | "mean" => Ok(CenterMeasure::Avg),
            "median" => Ok(CenterMeasure::Median),
            _ => Err(MergeError::InvalidConfig(format!(
                "Unknown center measure '{}'. Valid options: {}",
                s,
                CenterMeasure::variants().join(", ")
            ))),
        }
    }
}

/// Transform turning an intensity into a centroid weight.
///
/// Negative or non-finite weights count as zero.
#[derive(Debug, Clone, Copy, Default)]
pub enum Weighting {
    /// Every member weighs 1
    None,
    /// Weight = intensity
    #[default]
    Linear,
    /// Weight = sqrt(intensity)
    Sqrt,
    /// Weight = cbrt(intensity)
    Cbrt,
    /// Weight = log10(intensity)
    Log10,
    /// User supplied transform
    Custom(fn(f64) -> f64),
}

impl Weighting {
    /// Weight for one member intensity
    #[inline]
    pub fn weight(&self, intensity: f64) -> f64 {
        let w = match self {
            Weighting::None => 1.0,
            Weighting::Linear => intensity,
            Weighting::Sqrt => intensity.sqrt(),
            Weighting::Cbrt => intensity.cbrt(),
            Weighting::Log10 => intensity.log10(),
            Weighting::Custom(f) => f(intensity),
        };
        if w.is_finite() && w > 0.0 {
            w
        } else {
            0.0
        }
    }

    /// Returns all weighting names that can be parsed.
    pub fn variants() -> &'static [&'static str] {
        &["none", "linear", "sqrt", "cbrt", "log10"]
    }
}

impl PartialEq for Weighting {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Weighting::Custom(a), Weighting::Custom(b)) => *a as usize == *b as usize,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Display for Weighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weighting::None => write!(f, "none"),
            Weighting::Linear => write!(f, "linear"),
            Weighting::Sqrt => write!(f, "sqrt"),
            Weighting::Cbrt => write!(f, "cbrt"),
            Weighting::Log10 => write!(f, "log10"),
            Weighting::Custom(_) => write!(f, "custom"),
        }
    }
}

impl FromStr for Weighting {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "unweighted" => Ok(Weighting::None),
            "linear" | "intensity" => Ok(Weighting::Linear),
            "sqrt" => Ok(Weighting::Sqrt),
            "cbrt" => Ok(Weighting::Cbrt),
            "log10" | "log" => Ok(Weighting::Log10),
            _ => Err(MergeError::InvalidConfig(format!(
                "Unknown weighting '{}'. Valid options: {}",
                s,
                Weighting::variants().join(", ")
            ))),
        }
    }
}

/// Measure plus weighting used to place a merged point
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CenterFunction {
    /// How positions are combined
    pub measure: CenterMeasure,
    /// How intensities turn into weights
    pub weighting: Weighting,
}

impl CenterFunction {
    /// Create a center function
    pub fn new(measure: CenterMeasure, weighting: Weighting) -> Self {
        Self { measure, weighting }
    }

    /// Plain arithmetic mean of positions
    pub fn unweighted() -> Self {
        Self::new(CenterMeasure::Avg, Weighting::None)
    }

    /// Intensity-weighted mean of positions (the default)
    pub fn intensity_weighted() -> Self {
        Self::new(CenterMeasure::Avg, Weighting::Linear)
    }

    /// Center of the given members.
    ///
    /// `positions` and `intensities` are parallel. Returns NaN for no members.
    pub fn calculate(&self, positions: &[f64], intensities: &[f64]) -> f64 {
        debug_assert_eq!(positions.len(), intensities.len());
        if positions.is_empty() {
            return f64::NAN;
        }
        if positions.len() == 1 {
            return positions[0];
        }
        let weights: Vec<f64> = intensities.iter().map(|&i| self.weighting.weight(i)).collect();
        let total: f64 = weights.iter().sum();
        let weighted = total > 0.0 && total.is_finite();

        match self.measure {
            CenterMeasure::Avg if weighted => weighted_mean(positions, &weights, total),
            CenterMeasure::Avg => mean(positions),
            CenterMeasure::Median
                if weighted && !matches!(self.weighting, Weighting::None) =>
            {
                weighted_median(positions, &weights, total)
            }
            CenterMeasure::Median => median(positions),
        }
    }
}

impl fmt::Display for CenterFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} weighting)", self.measure, self.weighting)
    }
}

// Offsets from the first position keep identical positions exact.
fn weighted_mean(positions: &[f64], weights: &[f64], total: f64) -> f64 {
    let reference = positions[0];
    let shift: f64 = positions
        .iter()
        .zip(weights)
        .map(|(&p, &w)| (p - reference) * w)
        .sum();
    reference + shift / total
}

fn mean(positions: &[f64]) -> f64 {
    let reference = positions[0];
    let shift: f64 = positions.iter().map(|&p| p - reference).sum();
    reference + shift / positions.len() as f64
}

fn median(positions: &[f64]) -> f64 {
    let mut sorted = positions.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        let (lo, hi) = (sorted[n / 2 - 1], sorted[n / 2]);
        lo + (hi - lo) / 2.0
    }
}

/// Lowest position at which the cumulative weight reaches half the total
fn weighted_median(positions: &[f64], weights: &[f64], total: f64) -> f64 {
    let mut pairs: Vec<(f64, f64)> = positions.iter().copied().zip(weights.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let half = total / 2.0;
    let mut cumulative = 0.0;
    for &(position, weight) in &pairs {
        cumulative += weight;
        if cumulative >= half {
            return position;
        }
    }
    pairs[pairs.len() - 1].0
}

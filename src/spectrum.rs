//! Spectrum data types: samples, source-indexed samples and SoA spectra.
//!
//! Spectra are stored structure-of-arrays (parallel `positions` and
//! `intensities` vectors), mirroring how vendor readers hand out decoded
//! binary arrays.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};

/// A single measured point: position (e.g. m/z) and intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Position on the x axis (m/z, retention time, ...)
    pub position: f64,
    /// Measured intensity
    pub intensity: f64,
}

impl Sample {
    /// Create a new sample
    #[inline]
    pub fn new(position: f64, intensity: f64) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

/// A [`Sample`] tagged with the index of the spectrum it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexedSample {
    /// The sample itself
    pub sample: Sample,
    /// Index of the source spectrum in the merged collection
    pub source: usize,
}

impl IndexedSample {
    /// Create a new indexed sample
    #[inline]
    pub fn new(position: f64, intensity: f64, source: usize) -> Self {
        Self {
            sample: Sample::new(position, intensity),
            source,
        }
    }

    /// Position of the wrapped sample
    #[inline]
    pub fn position(&self) -> f64 {
        self.sample.position
    }

    /// Intensity of the wrapped sample
    #[inline]
    pub fn intensity(&self) -> f64 {
        self.sample.intensity
    }
}

/// Strongest first, then lowest position, then lowest source.
///
/// Used to feed clustering so that the outcome does not depend on the order
/// in which spectra or samples were supplied.
pub(crate) fn descending_intensity_order(a: &IndexedSample, b: &IndexedSample) -> Ordering {
    b.intensity()
        .total_cmp(&a.intensity())
        .then_with(|| a.position().total_cmp(&b.position()))
        .then_with(|| a.source.cmp(&b.source))
}

/// One spectrum in structure-of-arrays layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    positions: Vec<f64>,
    intensities: Vec<f64>,
}

impl Spectrum {
    /// Create a spectrum from parallel arrays.
    ///
    /// Fails with [`MergeError::PreconditionViolation`] if the arrays differ in
    /// length. Sorting is not checked here.
    pub fn new(positions: Vec<f64>, intensities: Vec<f64>) -> Result<Self> {
        if positions.len() != intensities.len() {
            return Err(MergeError::PreconditionViolation(format!(
                "positions ({}) and intensities ({}) differ in length",
                positions.len(),
                intensities.len()
            )));
        }
        Ok(Self {
            positions,
            intensities,
        })
    }

    /// Empty spectrum
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a spectrum from samples
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = Sample>,
    {
        let (positions, intensities) = samples
            .into_iter()
            .map(|s| (s.position, s.intensity))
            .unzip();
        Self {
            positions,
            intensities,
        }
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the spectrum has no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sample positions
    #[inline]
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Sample intensities
    #[inline]
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Sample at index `i`
    #[inline]
    pub fn sample(&self, i: usize) -> Sample {
        Sample::new(self.positions[i], self.intensities[i])
    }

    /// Iterate over samples in storage order
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.positions
            .iter()
            .zip(self.intensities.iter())
            .map(|(&p, &i)| Sample::new(p, i))
    }

    /// Consume into the parallel arrays
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.positions, self.intensities)
    }

    /// Keep only samples whose intensity is strictly above `floor`
    pub fn filter_above(&self, floor: f64) -> Self {
        Self::from_samples(self.samples().filter(|s| s.intensity > floor))
    }

    /// Sum of all intensities
    pub fn total_intensity(&self) -> f64 {
        self.intensities.iter().sum()
    }

    /// Most intense sample, if any
    pub fn base_peak(&self) -> Option<Sample> {
        self.samples()
            .max_by(|a, b| a.intensity.total_cmp(&b.intensity))
    }

    /// Whether positions are non-decreasing
    pub fn is_sorted_by_position(&self) -> bool {
        self.positions.windows(2).all(|w| w[0] <= w[1])
    }

    /// Copy sorted ascending by position (stable)
    pub fn sorted_by_position(&self) -> Self {
        let mut samples: Vec<Sample> = self.samples().collect();
        samples.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self::from_samples(samples)
    }

    /// Samples sorted by descending intensity; equal intensities keep their
    /// original order
    pub fn sorted_by_intensity(&self) -> Vec<Sample> {
        let mut samples: Vec<Sample> = self.samples().collect();
        samples.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
        samples
    }
}

/// Consensus spectrum produced by a merge, sorted ascending by position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedSpectrum {
    /// Merged positions
    pub positions: Vec<f64>,
    /// Merged intensities
    pub intensities: Vec<f64>,
}

impl MergedSpectrum {
    /// Empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of consensus points
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing survived the merge
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Highest merged intensity, if any
    pub fn max_intensity(&self) -> Option<f64> {
        self.intensities.iter().copied().max_by(|a, b| a.total_cmp(b))
    }

    /// Iterate over merged points
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.positions
            .iter()
            .zip(self.intensities.iter())
            .map(|(&p, &i)| Sample::new(p, i))
    }

    /// Convert into a plain spectrum, e.g. to feed a further merge
    pub fn to_spectrum(&self) -> Spectrum {
        Spectrum {
            positions: self.positions.clone(),
            intensities: self.intensities.clone(),
        }
    }
}

impl From<Spectrum> for MergedSpectrum {
    fn from(spectrum: Spectrum) -> Self {
        let (positions, intensities) = spectrum.into_parts();
        Self {
            positions,
            intensities,
        }
    }
}

impl std::fmt::Display for MergedSpectrum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.samples().max_by(|a, b| a.intensity.total_cmp(&b.intensity)) {
            Some(base) => write!(
                f,
                "MergedSpectrum(data points: {}, max by intensity: ({:.4}, {}))",
                self.len(),
                base.position,
                base.intensity
            ),
            None => write!(f, "MergedSpectrum(data points: 0)"),
        }
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::center::CenterFunction;
use crate::error::{MergeError, Result};
use crate::tolerance::ToleranceWindow;

/// How member intensities combine into the merged intensity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntensityMerging {
    /// Sum of member intensities
    #[default]
    Summed,
    /// Highest member intensity
    Maximum,
    /// Mean member intensity
    Average,
}

impl IntensityMerging {
    /// Stable identifier used in configuration files
    pub fn unique_id(&self) -> &'static str {
        match self {
            IntensityMerging::Summed => "SUMMED",
            IntensityMerging::Maximum => "MAXIMUM",
            IntensityMerging::Average => "AVERAGE",
        }
    }

    /// Returns all accepted identifiers.
    pub fn variants() -> &'static [&'static str] {
        &["SUMMED", "MAXIMUM", "AVERAGE"]
    }

    /// Combine intensities; 0.0 for an empty slice
    pub fn combine(&self, intensities: &[f64]) -> f64 {
        if intensities.is_empty() {
            return 0.0;
        }
        match self {
            IntensityMerging::Summed => intensities.iter().sum(),
            IntensityMerging::Maximum => intensities.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            IntensityMerging::Average => {
                intensities.iter().sum::<f64>() / intensities.len() as f64
            }
        }
    }
}

impl fmt::Display for IntensityMerging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.unique_id())
    }
}

impl FromStr for IntensityMerging {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "SUMMED" | "SUM" => Ok(IntensityMerging::Summed),
            "MAXIMUM" | "MAX" => Ok(IntensityMerging::Maximum),
            "AVERAGE" | "AVG" | "MEAN" => Ok(IntensityMerging::Average),
            _ => Err(MergeError::InvalidConfig(format!(
                "Unknown intensity merging '{}'. Valid options: {}",
                s,
                IntensityMerging::variants().join(", ")
            ))),
        }
    }
}

/// Configuration for the spectral merger
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConfig {
    /// Window within which samples of different spectra are merged
    pub tolerance: ToleranceWindow,

    /// Intensity aggregation
    pub intensity_merging: IntensityMerging,

    /// Centroid measure and weighting
    pub center: CenterFunction,

    /// Samples at or below this intensity are dropped before clustering
    pub input_floor: Option<f64>,

    /// Merged points at or below this intensity are dropped
    pub output_floor: Option<f64>,

    /// Merged points at or below this fraction of the most intense merged
    /// point are dropped (0.0 to 1.0)
    pub output_floor_relative: Option<f64>,

    /// Merged points built from fewer samples are dropped
    pub min_cluster_size: Option<usize>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self::ms1()
    }
}

impl MergeConfig {
    /// Preset for merging MS1 scans: 0.005 + 15 ppm, summed, intensity weighted
    pub fn ms1() -> Self {
        Self {
            tolerance: ToleranceWindow::default_ms1_merge(),
            intensity_merging: IntensityMerging::Summed,
            center: CenterFunction::intensity_weighted(),
            input_floor: None,
            output_floor: None,
            output_floor_relative: None,
            min_cluster_size: None,
        }
    }

    /// Preset for merging MS2 scans: 0.008 + 25 ppm, maximum intensity
    pub fn ms2() -> Self {
        Self {
            tolerance: ToleranceWindow::default_ms2_merge(),
            intensity_merging: IntensityMerging::Maximum,
            ..Self::ms1()
        }
    }

    /// Plain configuration around a given tolerance
    pub fn with_tolerance(tolerance: ToleranceWindow) -> Self {
        Self {
            tolerance,
            ..Self::ms1()
        }
    }

    /// Check floors and thresholds.
    ///
    /// The tolerance is validated when it is constructed.
    pub fn validate(&self) -> Result<()> {
        for (name, floor) in [
            ("input_floor", self.input_floor),
            ("output_floor", self.output_floor),
        ] {
            if let Some(value) = floor {
                if value.is_nan() {
                    return Err(MergeError::InvalidConfig(format!("{} must not be NaN", name)));
                }
            }
        }
        if let Some(rel) = self.output_floor_relative {
            if !(0.0..=1.0).contains(&rel) {
                return Err(MergeError::InvalidConfig(format!(
                    "output_floor_relative must be within 0.0 and 1.0, got {}",
                    rel
                )));
            }
        }
        if self.min_cluster_size == Some(0) {
            return Err(MergeError::InvalidConfig(
                "min_cluster_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

//! Merge presets for common acquisition types.
//!
//! Presets pick tolerance and intensity policy so that most users never have
//! to touch the individual merge flags.

use std::fmt;
use std::str::FromStr;

use mzmerge::merge::MergeConfig;

/// Merge presets for common use cases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Preset {
    /// Survey scans (default).
    ///
    /// - Tolerance: 0.005 + 15 ppm
    /// - Intensities: summed
    #[default]
    Ms1,

    /// Fragment scans.
    ///
    /// - Tolerance: 0.008 + 25 ppm
    /// - Intensities: maximum
    Ms2,
}

impl Preset {
    /// Returns the merge configuration for this preset.
    pub fn merge_config(&self) -> MergeConfig {
        match self {
            Preset::Ms1 => MergeConfig::ms1(),
            Preset::Ms2 => MergeConfig::ms2(),
        }
    }

    /// Returns all available preset names.
    pub fn variants() -> &'static [&'static str] {
        &["ms1", "ms2"]
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Ms1 => write!(f, "ms1"),
            Preset::Ms2 => write!(f, "ms2"),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ms1" | "survey" | "default" => Ok(Preset::Ms1),
            "ms2" | "msms" | "fragment" => Ok(Preset::Ms2),
            _ => Err(format!(
                "Unknown preset '{}'. Valid options: {}",
                s,
                Preset::variants().join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mzmerge::merge::IntensityMerging;

    #[test]
    fn test_preset_defaults() {
        let preset = Preset::default();
        assert_eq!(preset, Preset::Ms1);
        let config = preset.merge_config();
        assert_eq!(config.intensity_merging, IntensityMerging::Summed);
        assert_eq!(config.tolerance.absolute(), 0.005);
    }

    #[test]
    fn test_ms2_preset() {
        let config = Preset::Ms2.merge_config();
        assert_eq!(config.intensity_merging, IntensityMerging::Maximum);
        assert_eq!(config.tolerance.absolute(), 0.008);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!(Preset::from_str("ms1").unwrap(), Preset::Ms1);
        assert_eq!(Preset::from_str("MS2").unwrap(), Preset::Ms2);
        assert_eq!(Preset::from_str("fragment").unwrap(), Preset::Ms2);
        assert!(Preset::from_str("ms3").is_err());
    }
}

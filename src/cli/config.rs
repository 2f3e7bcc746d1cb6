//! TOML configuration file support for power users.
//!
//! Instead of passing many CLI flags, users can keep settings in a config file:
//!
//! ```toml
//! # mzmerge.toml
//! [merge]
//! preset = "ms2"
//! absolute = 0.01
//! ppm = 20.0
//! intensity = "sum"
//! weighting = "sqrt"
//! output_floor_relative = 0.01
//!
//! [align]
//! absolute = 0.02
//!
//! [storage]
//! segment_capacity = 268435456
//! store_in_ram = false
//! ```
//!
//! Values given on the command line win over the file.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use mzmerge::merge::MergeConfig;
use mzmerge::storage::StorageConfig;
use mzmerge::tolerance::ToleranceWindow;

use super::preset::Preset;

/// Root configuration structure for mzmerge.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Settings for the merge command.
    #[serde(default)]
    pub merge: MergeSection,

    /// Settings for the align command.
    #[serde(default)]
    pub align: AlignSection,

    /// Off-heap storage settings.
    #[serde(default)]
    pub storage: StorageSection,
}

/// Configuration for the merge command.
#[derive(Debug, Default, Deserialize)]
pub struct MergeSection {
    /// Starting preset (ms1, ms2).
    pub preset: Option<String>,

    /// Absolute tolerance component.
    pub absolute: Option<f64>,

    /// Relative tolerance component in ppm.
    pub ppm: Option<f64>,

    /// Intensity merging policy (sum, max, avg).
    pub intensity: Option<String>,

    /// Center measure (avg, median).
    pub center: Option<String>,

    /// Intensity weighting for centers (none, linear, sqrt, cbrt, log10).
    pub weighting: Option<String>,

    /// Drop input samples at or below this intensity.
    pub input_floor: Option<f64>,

    /// Drop merged points at or below this intensity.
    pub output_floor: Option<f64>,

    /// Drop merged points at or below this fraction of the base peak.
    pub output_floor_relative: Option<f64>,

    /// Minimum number of merged samples per point.
    pub min_cluster_size: Option<usize>,
}

/// Configuration for the align command.
#[derive(Debug, Default, Deserialize)]
pub struct AlignSection {
    /// Absolute tolerance component.
    pub absolute: Option<f64>,

    /// Relative tolerance component in ppm.
    pub ppm: Option<f64>,

    /// Position offset applied to the second spectrum.
    pub offset: Option<f64>,
}

/// Configuration for off-heap storage.
#[derive(Debug, Default, Deserialize)]
pub struct StorageSection {
    /// Segment size in bytes.
    pub segment_capacity: Option<u64>,

    /// Keep results on the heap.
    pub store_in_ram: Option<bool>,

    /// Directory for segment files.
    pub temp_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

impl MergeSection {
    /// Build a merge configuration from this section.
    pub fn to_merge_config(&self) -> Result<MergeConfig> {
        let preset: Preset = match &self.preset {
            Some(name) => name.parse().map_err(|e: String| anyhow!(e))?,
            None => Preset::default(),
        };
        let mut config = preset.merge_config();

        if self.absolute.is_some() || self.ppm.is_some() {
            config.tolerance = ToleranceWindow::from_ppm(
                self.absolute.unwrap_or(config.tolerance.absolute()),
                self.ppm.unwrap_or(config.tolerance.ppm()),
            )?;
        }
        if let Some(intensity) = &self.intensity {
            config.intensity_merging = intensity.parse()?;
        }
        if let Some(center) = &self.center {
            config.center.measure = center.parse()?;
        }
        if let Some(weighting) = &self.weighting {
            config.center.weighting = weighting.parse()?;
        }
        config.input_floor = self.input_floor.or(config.input_floor);
        config.output_floor = self.output_floor.or(config.output_floor);
        config.output_floor_relative = self.output_floor_relative.or(config.output_floor_relative);
        config.min_cluster_size = self.min_cluster_size.or(config.min_cluster_size);

        config.validate()?;
        Ok(config)
    }
}

impl AlignSection {
    /// Tolerance for alignment, falling back to `default`.
    pub fn tolerance(&self, default: ToleranceWindow) -> Result<ToleranceWindow> {
        if self.absolute.is_none() && self.ppm.is_none() {
            return Ok(default);
        }
        Ok(ToleranceWindow::from_ppm(
            self.absolute.unwrap_or(default.absolute()),
            self.ppm.unwrap_or(default.ppm()),
        )?)
    }
}

impl StorageSection {
    /// Build a storage configuration from this section.
    pub fn to_storage_config(&self) -> StorageConfig {
        let defaults = StorageConfig::default();
        StorageConfig {
            segment_capacity: self.segment_capacity.unwrap_or(defaults.segment_capacity),
            store_in_ram: self.store_in_ram.unwrap_or(defaults.store_in_ram),
            temp_dir: self.temp_dir.clone().or(defaults.temp_dir),
        }
    }
}

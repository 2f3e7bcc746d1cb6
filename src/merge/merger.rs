use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::center::CenterFunction;
use super::cluster_map::{Cluster, Interval, IntervalClusterMap};
use super::config::{IntensityMerging, MergeConfig};
use crate::error::{MergeError, Result};
use crate::spectrum::{descending_intensity_order, IndexedSample, MergedSpectrum, Spectrum};
use crate::tolerance::ToleranceWindow;

/// One merged point together with the samples it was built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusCluster {
    /// Merged position
    pub position: f64,
    /// Merged intensity
    pub intensity: f64,
    /// Contributing samples, ordered by source index
    pub members: Vec<IndexedSample>,
    /// Interval owned by the cluster when clustering finished
    pub interval: Option<Interval>,
}

impl ConsensusCluster {
    /// Number of contributing samples
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the cluster has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Statistics from a completed merge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeStats {
    /// Number of input spectra
    pub spectra: usize,
    /// Samples that entered clustering
    pub samples_clustered: usize,
    /// Samples dropped by the input floor or for non-finite values
    pub samples_dropped: usize,
    /// Clusters formed
    pub clusters: usize,
    /// Points in the merged spectrum
    pub points_written: usize,
}

impl fmt::Display for MergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Merged {} spectra ({} samples, {} dropped) into {} clusters, {} points kept",
            self.spectra,
            self.samples_clustered,
            self.samples_dropped,
            self.clusters,
            self.points_written
        )
    }
}

/// Tolerance-based merger of related spectra into one consensus spectrum.
///
/// Samples of all spectra are clustered strongest first, so every merged point
/// is anchored on its most intense contribution. Two samples of the same
/// spectrum never end up in one merged point.
///
/// # Example
///
/// ```rust
/// use mzmerge::merge::{MergeConfig, SpectralMerger};
/// use mzmerge::spectrum::Spectrum;
///
/// let merger = SpectralMerger::new(MergeConfig::ms1())?;
/// let merged = merger.merge(&[
///     Spectrum::new(vec![100.0, 200.0], vec![10.0, 5.0])?,
///     Spectrum::new(vec![100.001, 300.0], vec![20.0, 1.0])?,
/// ]);
/// assert_eq!(merged.len(), 3);
/// assert_eq!(merged.intensities[0], 30.0);
/// # Ok::<(), mzmerge::MergeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SpectralMerger {
    config: MergeConfig,
}

impl SpectralMerger {
    /// Create a merger, validating the configuration
    pub fn new(config: MergeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge `spectra` into one spectrum sorted ascending by position.
    ///
    /// No input gives an empty result. A single spectrum is returned as is
    /// (only sorted by position if needed), without floors or clustering.
    pub fn merge(&self, spectra: &[Spectrum]) -> MergedSpectrum {
        self.merge_with_stats(spectra).0
    }

    /// [`merge`](Self::merge) that also reports what happened
    pub fn merge_with_stats(&self, spectra: &[Spectrum]) -> (MergedSpectrum, MergeStats) {
        match spectra {
            [] => (MergedSpectrum::empty(), MergeStats::default()),
            [single] => {
                let spectrum = if single.is_sorted_by_position() {
                    single.clone()
                } else {
                    single.sorted_by_position()
                };
                let stats = MergeStats {
                    spectra: 1,
                    samples_clustered: 0,
                    samples_dropped: 0,
                    clusters: 0,
                    points_written: spectrum.len(),
                };
                (MergedSpectrum::from(spectrum), stats)
            }
            _ => {
                let (clusters, mut stats) = self.cluster(spectra);
                let consensus = self.finalize(clusters);
                stats.points_written = consensus.len();
                debug!("{}", stats);

                let (positions, intensities) =
                    consensus.into_iter().map(|c| (c.position, c.intensity)).unzip();
                (
                    MergedSpectrum {
                        positions,
                        intensities,
                    },
                    stats,
                )
            }
        }
    }

    /// Merge and keep provenance: every kept cluster with its members.
    ///
    /// Unlike [`merge`](Self::merge), a single spectrum is clustered as well.
    /// Clusters come back sorted ascending by position.
    pub fn merge_clusters(&self, spectra: &[Spectrum]) -> Vec<ConsensusCluster> {
        if spectra.is_empty() {
            return Vec::new();
        }
        let (clusters, _) = self.cluster(spectra);
        self.finalize(clusters)
    }

    /// Merge every bin independently on the rayon thread pool.
    ///
    /// Results are ordered by bin key.
    pub fn merge_binned<K>(&self, bins: &BTreeMap<K, Vec<Spectrum>>) -> Vec<(K, MergedSpectrum)>
    where
        K: Ord + Copy + Send + Sync,
    {
        let mut merged: Vec<(K, MergedSpectrum)> = bins
            .par_iter()
            .map(|(&key, spectra)| (key, self.merge(spectra)))
            .collect();
        merged.sort_by(|a, b| a.0.cmp(&b.0));
        debug!("Merged {} bins", merged.len());
        merged
    }

    fn cluster(&self, spectra: &[Spectrum]) -> (Vec<Cluster>, MergeStats) {
        let floor = self.config.input_floor;
        let total: usize = spectra.iter().map(Spectrum::len).sum();

        let mut samples: Vec<IndexedSample> = spectra
            .iter()
            .enumerate()
            .flat_map(|(source, spectrum)| {
                spectrum
                    .samples()
                    .map(move |sample| IndexedSample { sample, source })
            })
            .filter(|s| s.position().is_finite() && s.intensity().is_finite())
            .filter(|s| floor.map_or(true, |f| s.intensity() > f))
            .collect();
        samples.sort_by(descending_intensity_order);

        let mut map = IntervalClusterMap::new(self.config.tolerance);
        let samples_clustered = samples.len();
        for sample in samples {
            map.insert(sample);
        }

        let stats = MergeStats {
            spectra: spectra.len(),
            samples_clustered,
            samples_dropped: total - samples_clustered,
            clusters: map.len(),
            points_written: 0,
        };
        (map.into_clusters(), stats)
    }

    fn finalize(&self, clusters: Vec<Cluster>) -> Vec<ConsensusCluster> {
        let config = &self.config;
        let mut consensus: Vec<ConsensusCluster> = clusters
            .iter()
            .filter(|c| config.min_cluster_size.map_or(true, |min| c.len() >= min))
            .map(|c| consensus_of(c, config.intensity_merging, &config.center))
            .filter(|c| config.output_floor.map_or(true, |floor| c.intensity > floor))
            .collect();

        if let Some(rel) = config.output_floor_relative.filter(|&r| r > 0.0) {
            let max = consensus
                .iter()
                .map(|c| c.intensity)
                .fold(f64::NEG_INFINITY, f64::max);
            let threshold = max * rel;
            if threshold > config.output_floor.unwrap_or(f64::NEG_INFINITY) {
                consensus.retain(|c| c.intensity > threshold);
            }
        }

        consensus.sort_by(|a, b| a.position.total_cmp(&b.position));
        consensus
    }
}

fn consensus_of(cluster: &Cluster, merging: IntensityMerging, center: &CenterFunction) -> ConsensusCluster {
    let members: Vec<IndexedSample> = cluster.members().copied().collect();

    // aggregate in value order so that the order of the input spectra does not matter
    let mut ordered: Vec<(f64, f64)> = members.iter().map(|m| (m.position(), m.intensity())).collect();
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));
    let (positions, intensities): (Vec<f64>, Vec<f64>) = ordered.into_iter().unzip();

    ConsensusCluster {
        position: center.calculate(&positions, &intensities),
        intensity: merging.combine(&intensities),
        members,
        interval: cluster.interval(),
    }
}

/// Group `(key, item)` pairs into bins of `bin_width` consecutive keys.
///
/// The bin key is `key.div_euclid(bin_width)`, so negative keys bin
/// consistently. Fails with [`MergeError::InvalidConfig`] if `bin_width < 1`.
pub fn bin_spectra<T, I>(items: I, bin_width: i64) -> Result<BTreeMap<i64, Vec<T>>>
where
    I: IntoIterator<Item = (i64, T)>,
{
    if bin_width < 1 {
        return Err(MergeError::InvalidConfig(format!(
            "bin width must be at least 1, got {}",
            bin_width
        )));
    }
    let mut bins: BTreeMap<i64, Vec<T>> = BTreeMap::new();
    for (key, item) in items {
        bins.entry(key.div_euclid(bin_width)).or_default().push(item);
    }
    Ok(bins)
}

/// One-shot merge with explicit policies.
///
/// Fails only if a floor is NaN.
pub fn merge_spectra(
    spectra: &[Spectrum],
    tolerance: ToleranceWindow,
    intensity_merging: IntensityMerging,
    center: CenterFunction,
    input_floor: Option<f64>,
    output_floor: Option<f64>,
) -> Result<MergedSpectrum> {
    let config = MergeConfig {
        tolerance,
        intensity_merging,
        center,
        input_floor,
        output_floor,
        output_floor_relative: None,
        min_cluster_size: None,
    };
    Ok(SpectralMerger::new(config)?.merge(spectra))
}

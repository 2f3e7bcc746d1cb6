//! # Spectral Merging
//!
//! Builds one consensus spectrum out of many related spectra (for example the
//! mobility scans of one frame, or repeated MS2 scans of one precursor).
//!
//! ## Algorithm
//!
//! 1. **Pool**: every sample is tagged with the index of its spectrum and
//!    samples at or below the input floor are dropped.
//!
//! 2. **Cluster**: samples are fed strongest first into an
//!    [`IntervalClusterMap`], which keeps disjoint intervals on the position
//!    axis. A sample joins the cluster whose interval contains it, unless that
//!    cluster already holds a sample of the same spectrum; then it opens a
//!    cluster of its own.
//!
//! 3. **Finalize**: each cluster becomes one point, positioned by a
//!    [`CenterFunction`] and with an intensity combined by
//!    [`IntensityMerging`]. Points are filtered by the output floors and sorted
//!    by position.
//!
//! Merging is pure and synchronous. [`SpectralMerger::merge_binned`] runs
//! independent bins in parallel, each with its own cluster map.

mod center;
mod cluster_map;
mod config;
mod merger;


pub use center::{CenterFunction, CenterMeasure, Weighting};
pub use cluster_map::{Bound, Cluster, Interval, IntervalClusterMap};
pub use config::{IntensityMerging, MergeConfig};
pub use merger::{bin_spectra, merge_spectra, ConsensusCluster, MergeStats, SpectralMerger};

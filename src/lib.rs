//! # mzmerge - Spectra Merging, Alignment and Off-Heap Storage
//!
//! `mzmerge` turns many related mass spectra into one consensus spectrum,
//! aligns pairs of spectra sample by sample, and keeps long-lived numeric
//! arrays in memory-mapped segments instead of on the heap.
//!
//! ## Key Features
//!
//! - **Tolerance-based merging**: samples of different spectra that fall into
//!   one absolute + relative tolerance window become one merged point. Two
//!   samples of the same spectrum are never merged.
//!
//! - **Deterministic output**: samples are clustered strongest first with a
//!   total tie-break order, so the result does not depend on input order.
//!
//! - **Pluggable policies**: summed, maximum or average intensities; mean or
//!   median centroids with linear, sqrt, cbrt, log10 or custom weighting.
//!
//! - **Greedy pairwise alignment**: strongest-first one-to-one matching with
//!   optional position offsets for modification-aware comparisons, plus
//!   cosine scoring.
//!
//! - **Off-heap storage**: append-only arena over anonymous temp files; views
//!   borrow the arena so they can never outlive it.
//!
//! ## Quick Start
//!
//! ```rust
//! use mzmerge::prelude::*;
//!
//! let spectra = vec![
//!     Spectrum::new(vec![100.0, 250.0], vec![10.0, 4.0])?,
//!     Spectrum::new(vec![100.0], vec![20.0])?,
//!     Spectrum::new(vec![100.0, 250.001], vec![5.0, 2.0])?,
//! ];
//!
//! let config = MergeConfig {
//!     tolerance: ToleranceWindow::absolute_only(0.01)?,
//!     intensity_merging: IntensityMerging::Summed,
//!     center: CenterFunction::unweighted(),
//!     ..MergeConfig::default()
//! };
//! let merged = SpectralMerger::new(config)?.merge(&spectra);
//!
//! assert_eq!(merged.positions[0], 100.0);
//! assert_eq!(merged.intensities, vec![35.0, 6.0]);
//! # Ok::<(), mzmerge::MergeError>(())
//! ```
//!
//! ## Keeping Results Off-Heap
//!
//! ```rust
//! use mzmerge::storage::{store_or_keep, Storage, StorageConfig};
//!
//! let storage = Storage::acquire(&StorageConfig::with_segment_capacity(1 << 20))?;
//! let positions = store_or_keep(storage.as_ref(), vec![100.0f64, 250.0])?;
//! assert_eq!(&*positions, &[100.0, 250.0]);
//! # Ok::<(), mzmerge::storage::StorageError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`tolerance`]: absolute + relative matching window
//! - [`search`]: binary searches over ascending data
//! - [`spectrum`]: sample and spectrum types
//! - [`merge`]: interval cluster map and the spectral merger
//! - [`align`]: pairwise alignment and similarity scoring
//! - [`storage`]: memory-mapped arena for numeric arrays

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
// Allow some patterns common in scientific code
#![allow(clippy::too_many_arguments)]

pub mod align;
pub mod error;
pub mod merge;
pub mod search;
pub mod spectrum;
pub mod storage;
pub mod tolerance;

pub use error::{MergeError, Result};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::align::{
        align, align_modification_aware, align_with_offset, AlignedPair, AlignmentSummary,
        SimilarityWeights,
    };
    pub use crate::error::MergeError;
    pub use crate::merge::{
        merge_spectra, CenterFunction, CenterMeasure, ConsensusCluster, IntensityMerging,
        MergeConfig, MergeStats, SpectralMerger, Weighting,
    };
    pub use crate::spectrum::{IndexedSample, MergedSpectrum, Sample, Spectrum};
    pub use crate::storage::{
        store_or_keep, Storage, StorageConfig, StorageError, StorageStats, StoredArray, View,
    };
    pub use crate::tolerance::ToleranceWindow;
}
